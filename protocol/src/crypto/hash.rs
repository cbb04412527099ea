//! # Hashing Utilities
//!
//! Keccak-256 is the only hash function in QUILL, and that is deliberate.
//! Every digest a wallet displays, every document identifier, every
//! typed-data hash must be bit-identical to what an EVM-style ledger
//! recomputes on-chain. Keccak-256 (the original submission, not the
//! padded FIPS-202 SHA3-256) is what those ledgers speak, so it is what
//! we speak.
//!
//! ## Keccak vs SHA3
//!
//! A perennial source of grief: `sha3::Keccak256` and `sha3::Sha3_256`
//! differ in one padding byte and produce completely different digests.
//! Ethereum-lineage ledgers use the former. If a digest computed here ever
//! disagrees with an on-ledger recomputation, check this first.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::config::DIGEST_LENGTH;

/// Compute the Keccak-256 hash of the input data.
///
/// Returns a 32-byte digest as a fixed-size array. This is the workhorse
/// of the entire protocol: typed-data struct hashes, address derivation,
/// and document content digests all come from here.
///
/// # Example
///
/// ```
/// use quill_protocol::crypto::keccak256;
///
/// let digest = keccak256(b"Hello World!");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Keccak-256 over multiple concatenated segments.
///
/// Equivalent to `keccak256(&[a, b, c].concat())` without building the
/// intermediate buffer. Used by the typed-data encoder, where every
/// `hashStruct` is a hash over `typeHash || encodeData`.
pub fn keccak256_concat(segments: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Keccak256::new();
    for segment in segments {
        hasher.update(segment);
    }
    hasher.finalize().into()
}

// ---------------------------------------------------------------------------
// ContentHash
// ---------------------------------------------------------------------------

/// A 32-byte content digest identifying a document or profile payload.
///
/// The protocol never computes this from raw document bytes — hashing
/// arbitrary files is the caller's off-ledger responsibility. From the
/// registries' point of view a `ContentHash` is an opaque identity.
///
/// Serializes as a `0x`-prefixed hex string, the transport form every
/// external collaborator (wallets, indexers, the signing UI) expects.
///
/// # Examples
///
/// ```
/// use quill_protocol::crypto::{keccak256, ContentHash};
///
/// let hash = ContentHash::from(keccak256(b"Hello World!"));
/// assert!(hash.to_string().starts_with("0x"));
/// assert_eq!(hash, hash.to_string().parse().unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; DIGEST_LENGTH]);

impl ContentHash {
    /// Wrap an existing 32-byte digest.
    pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Compute the Keccak-256 digest of the given payload bytes.
    ///
    /// Convenience for tests and demos; production callers hash off-ledger
    /// and pass the result in.
    pub fn digest(payload: &[u8]) -> Self {
        Self(keccak256(payload))
    }

    /// The raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// The raw digest bytes by value.
    pub const fn to_bytes(self) -> [u8; DIGEST_LENGTH] {
        self.0
    }
}

impl From<[u8; DIGEST_LENGTH]> for ContentHash {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

/// Error parsing a hex-encoded 32-byte digest.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash: expected 32 hex-encoded bytes")]
pub struct ParseHashError;

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| ParseHashError)?;
        let arr: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| ParseHashError)?;
        Ok(Self(arr))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
