//! # QUILL Registry Contracts
//!
//! The on-ledger state machines of the QUILL document co-signing
//! protocol. Where `quill-protocol` answers "what was signed?", this
//! crate answers "so what happens now?":
//!
//! - **documents** — the multi-party signing lifecycle: create, sign,
//!   revoke, and the fully-signed predicate, with relayed (meta-
//!   transaction) variants of every signer action.
//! - **profiles** — KYC attestation: validator-set management and
//!   dual-signature profile registration.
//! - **nonce** — per-address replay counters backing the relayed paths.
//! - **meta** — the typed messages wallets sign and registries verify.
//! - **events** — the structured records every transition emits.
//!
//! ## Design Principles
//!
//! 1. State transitions are explicit enum-and-error affairs, not boolean
//!    flags. Every rejection names exactly which rule refused.
//! 2. Check everything, then write. Entry points are atomic: no error
//!    path leaves a nonce consumed or a document half-signed.
//! 3. Authorization is cryptographic or it doesn't happen — role checks
//!    compare stored addresses against the caller identity passed into
//!    each call; there is no ambient "current user".
//! 4. Every public type serializes (serde) for wire transport and
//!    inspection; binary values travel as `0x`-hex strings.

pub mod documents;
pub mod events;
pub mod meta;
pub mod nonce;
pub mod profiles;

pub use documents::{Document, DocumentError, DocumentRegistry, SignatureEntry};
pub use events::RegistryEvent;
pub use nonce::{NonceError, NonceRegistry};
pub use profiles::{Profile, ProfileError, ProfileRegistry};
