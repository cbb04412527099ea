//! # Keys and Addresses
//!
//! secp256k1 keypair management and ledger address derivation.
//!
//! Every signer in QUILL is identified by a 20-byte ledger address derived
//! from their secp256k1 public key the way EVM ledgers do it: hash the
//! uncompressed public key (minus the `0x04` prefix byte) with Keccak-256
//! and keep the last 20 bytes.
//!
//! ## Why secp256k1 and not Ed25519?
//!
//! The authorization model is built on *recovery*: a relayer hands the
//! registry a digest and a signature, and the registry derives which
//! address produced it. ECDSA over secp256k1 supports public-key recovery;
//! Ed25519 does not. End of debate.
//!
//! ## Security considerations
//!
//! - We use OS-level RNG (`OsRng`) for key generation. If your OS RNG is
//!   broken, you have bigger problems than QUILL.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::keccak256;
use super::signatures::RecoverableSignature;
use crate::config::{ADDRESS_LENGTH, DIGEST_LENGTH, SIGNING_KEY_LENGTH};

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed — leaking details
/// about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("prehash signing failed")]
    SigningFailed,
}

// ---------------------------------------------------------------------------
// LedgerAddress
// ---------------------------------------------------------------------------

/// A 20-byte ledger address — the identity every registry keys on.
///
/// Displayed and serialized as a `0x`-prefixed lowercase hex string;
/// parsing accepts any case, so checksummed addresses from external
/// tooling round-trip fine. Comparison is always on the raw bytes.
///
/// # Examples
///
/// ```
/// use quill_protocol::crypto::QuillKeypair;
///
/// let keypair = QuillKeypair::generate();
/// let address = keypair.address();
/// assert_eq!(address, address.to_string().parse().unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerAddress([u8; ADDRESS_LENGTH]);

impl LedgerAddress {
    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a secp256k1 public key.
    ///
    /// `keccak256(uncompressed_pubkey[1..])[12..]` — skip the `0x04` point
    /// prefix, hash the 64 coordinate bytes, keep the trailing 20.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[DIGEST_LENGTH - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// The raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LENGTH]> for LedgerAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerAddress({})", self)
    }
}

/// Error parsing a hex-encoded ledger address.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid ledger address: expected 20 hex-encoded bytes")]
pub struct ParseAddressError;

impl FromStr for LedgerAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| ParseAddressError)?;
        let arr: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| ParseAddressError)?;
        Ok(Self(arr))
    }
}

impl Serialize for LedgerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LedgerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// QuillKeypair
// ---------------------------------------------------------------------------

/// A secp256k1 keypair wrapping the signing and verifying keys.
///
/// This is the wallet side of the protocol: registries never hold one.
/// They exist so tests, demos, and off-ledger tooling can produce the
/// recoverable signatures the registries verify.
///
/// ## Serialization
///
/// `QuillKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Serializing private keys should be a deliberate, conscious act, not
/// something that happens because someone shoved a keypair into a JSON
/// response. Use `from_seed()` / `from_hex()` explicitly.
///
/// # Examples
///
/// ```
/// use quill_protocol::crypto::{keccak256, QuillKeypair};
///
/// let keypair = QuillKeypair::generate();
/// let digest = keccak256(b"a digest worth signing");
/// let signature = keypair.sign_prehash(&digest).unwrap();
/// assert_eq!(signature.to_bytes().len(), 65);
/// ```
pub struct QuillKeypair {
    /// The secp256k1 signing (private) key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

impl QuillKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the secp256k1 secret scalar. Fails if
    /// the bytes are zero or not below the curve order — unlike Ed25519,
    /// not every 32-byte string is a valid secp256k1 key.
    ///
    /// **Warning**: a weak seed gives a weak key. Use a proper CSPRNG or
    /// KDF to produce the seed bytes.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_bytes(&(*seed).into()).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    ///
    /// Convenience for loading keys in devnet tooling. Please don't put raw
    /// hex keys in config files in production. But for devnet, we're not
    /// going to pretend you won't do it anyway.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SIGNING_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_seed(&arr)
    }

    /// The public (verifying) key for this keypair.
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// The ledger address derived from this keypair's public key.
    pub fn address(&self) -> LedgerAddress {
        LedgerAddress::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a precomputed 32-byte digest, producing a recoverable signature.
    ///
    /// The digest is signed as-is — no additional hashing. Callers are
    /// expected to pass a typed-data digest or a content hash; signing
    /// anything a counterparty hands you without understanding what it
    /// commits you to is how people lose documents.
    pub fn sign_prehash(
        &self,
        digest: &[u8; DIGEST_LENGTH],
    ) -> Result<RecoverableSignature, KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|_| KeyError::SigningFailed)?;
        Ok(RecoverableSignature::from_parts(signature, recovery_id))
    }
}

impl fmt::Debug for QuillKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately omits key material.
        write!(f, "QuillKeypair({})", self.address())
    }
}
