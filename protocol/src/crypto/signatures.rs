//! # Recoverable Signatures
//!
//! ECDSA signature recovery — the backbone of authorization in QUILL.
//!
//! Nothing in the protocol ever asks "is this signature valid for this
//! public key?" The question is always "which address produced this
//! signature?", and the answer comes from secp256k1 public-key recovery.
//! That inversion is what makes relayed meta-transactions possible: the
//! registry doesn't need the signer present, only their signature.
//!
//! ## Why wrap `k256` instead of using it directly?
//!
//! 1. A single place to audit every recovery operation.
//! 2. Consistent error types across the codebase.
//! 3. The wire format (r || s || v, 65 bytes) and the recovery-id
//!    conventions (0/1 vs the ledger-traditional 27/28) live in exactly
//!    one module.
//!
//! If you're tempted to optimize these functions, please reconsider. Then
//! go read about signature malleability and come back when you've lost
//! the urge.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::keys::LedgerAddress;
use crate::config::{DIGEST_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur while decoding or recovering a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signature bytes are structurally invalid: wrong length, a
    /// recovery id outside {0, 1, 27, 28}, or an out-of-range scalar.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// The signature is well-formed but recovery produced no valid curve
    /// point for this digest. Either the digest or the signature is not
    /// what the signer actually signed.
    #[error("signature recovery yielded no valid curve point")]
    InvalidCurvePoint,
}

impl SignatureError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecoverableSignature
// ---------------------------------------------------------------------------

/// A secp256k1 ECDSA signature carrying its recovery id.
///
/// The wire format is the 65-byte packed form `r || s || v` that every
/// wallet produces. `v` is stored exactly as presented — both the raw
/// recovery id (0/1) and the ledger-traditional offset form (27/28) are
/// accepted; normalization happens at recovery time.
///
/// Decoding is strict: anything that isn't exactly 65 bytes is rejected,
/// never truncated or zero-padded.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    r: [u8; 32],
    s: [u8; 32],
    v: u8,
}

impl RecoverableSignature {
    /// Assemble from the three components as they appear on the wire.
    ///
    /// No validation happens here — scalars are range-checked when the
    /// signature is actually used for recovery, so that a malformed
    /// signature surfaces as an error at the verification boundary rather
    /// than a panic in a constructor.
    pub const fn from_rsv(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Build from a `k256` signature and recovery id, as produced by
    /// [`QuillKeypair::sign_prehash`](super::keys::QuillKeypair::sign_prehash).
    ///
    /// `v` is stored in the 27/28 offset form, matching what external
    /// wallet tooling emits.
    pub fn from_parts(signature: EcdsaSignature, recovery_id: RecoveryId) -> Self {
        let (r_bytes, s_bytes) = signature.split_bytes();
        Self {
            r: r_bytes.into(),
            s: s_bytes.into(),
            v: 27 + recovery_id.to_byte(),
        }
    }

    /// Decode the packed 65-byte `r || s || v` form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::malformed(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Encode as the packed 65-byte `r || s || v` form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// The `r` scalar bytes.
    pub const fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The `s` scalar bytes.
    pub const fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// The recovery byte exactly as presented.
    pub const fn v(&self) -> u8 {
        self.v
    }

    /// Normalize `v` to a `k256` recovery id.
    ///
    /// Accepts 0/1 and 27/28. Anything else — including the EIP-155
    /// chain-folded forms, which have no business appearing in typed-data
    /// signatures — is malformed.
    fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let normalized = match self.v {
            0 | 1 => self.v,
            27 | 28 => self.v - 27,
            other => {
                return Err(SignatureError::malformed(format!(
                    "invalid recovery id {}",
                    other
                )))
            }
        };
        // from_byte only rejects values > 3; 0/1 always succeed.
        RecoveryId::from_byte(normalized)
            .ok_or_else(|| SignatureError::malformed("invalid recovery id"))
    }

    /// Range-check the scalars and produce the underlying ECDSA signature.
    fn to_ecdsa(self) -> Result<EcdsaSignature, SignatureError> {
        EcdsaSignature::from_scalars(self.r, self.s)
            .map_err(|_| SignatureError::malformed("scalar out of range"))
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", self)
    }
}

impl FromStr for RecoverableSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| SignatureError::malformed(format!("hex decode failed: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Recover the ledger address that signed the given digest.
///
/// Performs secp256k1 public-key recovery, then derives the address as
/// the last 20 bytes of the Keccak-256 hash of the uncompressed public
/// key. The digest is used as-is (prehash mode) — this function neither
/// knows nor cares whether it came from the typed-data codec or a raw
/// content hash.
///
/// # Errors
///
/// [`SignatureError::MalformedSignature`] for an invalid recovery id or
/// out-of-range scalar; [`SignatureError::InvalidCurvePoint`] when the
/// scalars are in range but recovery produces no valid point.
pub fn recover_address(
    digest: &[u8; DIGEST_LENGTH],
    signature: &RecoverableSignature,
) -> Result<LedgerAddress, SignatureError> {
    let recovery_id = signature.recovery_id()?;
    let ecdsa = signature.to_ecdsa()?;
    let verifying_key = VerifyingKey::recover_from_prehash(digest, &ecdsa, recovery_id)
        .map_err(|_| SignatureError::InvalidCurvePoint)?;
    Ok(LedgerAddress::from_verifying_key(&verifying_key))
}

/// Recover and compare against an expected address.
///
/// Returns `false` on mismatch *and* on any recovery failure — a pure
/// boolean predicate, deliberately free of side effects and error
/// detail. Callers that need to distinguish "malformed" from "wrong
/// signer" use [`recover_address`] directly.
pub fn verify(
    digest: &[u8; DIGEST_LENGTH],
    signature: &RecoverableSignature,
    expected: &LedgerAddress,
) -> bool {
    matches!(recover_address(digest, signature), Ok(recovered) if recovered == *expected)
}
