//! # Typed-Data Codec
//!
//! Domain-separated, schema-bound structured messages and their canonical
//! digests. This is what stands between "a wallet signed 32 opaque bytes"
//! and "a signer committed to *this document, in this registry, on this
//! ledger, at this nonce*."
//!
//! ## Architecture
//!
//! ```text
//! schema.rs  — FieldType / FieldValue / TypedSchema (ordered field lists)
//! message.rs — Domain, TypedMessage::build (the validation boundary)
//! hashing.rs — encodeType / hashStruct / digest (structured-data V4)
//! profile.rs — the fixed SignerProfile schema + collaborator helpers
//! ```
//!
//! ## The contract with signers
//!
//! 1. Payloads are validated against their schema *before* hashing —
//!    a missing field is an error, never an implicit default.
//! 2. The domain (ledger id + verifying authority) is hashed into every
//!    digest, so a signature can never be replayed against another
//!    registry instance or another ledger.
//! 3. Hashing is deterministic and bit-exact across implementations:
//!    the host ledger recomputes these digests on-chain and the results
//!    must agree. Pinned cross-implementation vectors live in the tests.

pub mod hashing;
pub mod message;
pub mod profile;
pub mod schema;

pub use hashing::{digest, domain_separator, encode_type, hash_struct, type_hash};
pub use message::{Domain, TypedDataError, TypedMessage};
pub use profile::{profile_content_hash, profile_message, signer_profile_schema};
pub use schema::{FieldType, FieldValue, TypedSchema};
