//! # Cryptographic Primitives for QUILL
//!
//! Everything security-related in the protocol flows through this module:
//! every digest, every address, every signature recovery.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **secp256k1 ECDSA** for signatures — because the authorization model
//!   needs public-key recovery, and this is the curve that does it.
//! - **Keccak-256** for hashing — because the digests must match what an
//!   EVM-style ledger recomputes, byte for byte.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations (`k256`, `sha3`). The value added is the wire formats,
//! the address derivation, and a single choke point to audit.

pub mod hash;
pub mod keys;
pub mod signatures;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::{keccak256, keccak256_concat, ContentHash};
pub use keys::{LedgerAddress, QuillKeypair};
pub use signatures::{recover_address, verify, RecoverableSignature, SignatureError};
