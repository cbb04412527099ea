//! Canonical typed-data hashing (structured-data V4).
//!
//! This is the most safety-critical code in the repository. The digest
//! computed here is what signers sign and what the host ledger recomputes
//! on-chain; a single divergent byte breaks every signature check
//! downstream. The algorithm is the standard structured-data hashing
//! scheme, fixed at the V4 revision:
//!
//! ```text
//! typeHash        = keccak256(encodeType)            // "Name(type field,...)"
//! hashStruct(s)   = keccak256(typeHash || encodeData)
//! digest(m)       = keccak256(0x19 || 0x01 || hashStruct(domain) || hashStruct(m))
//! ```
//!
//! Value encoding: atomic values occupy one big-endian 32-byte word;
//! strings are dynamic and contribute the keccak-256 of their UTF-8 bytes.
//! Schemas here are flat — no nested structs, no arrays — so `encodeType`
//! never needs the transitive-closure rules of the full standard.
//!
//! Nothing in this module is configurable. That is the point.

use super::message::{Domain, TypedMessage};
use super::schema::{FieldValue, TypedSchema};
use crate::config::{DOMAIN_TYPE, TYPED_DATA_PREFIX};
use crate::crypto::hash::{keccak256, keccak256_concat};

/// Render the canonical `Name(type field,type field,...)` encoding of a
/// schema. This string is a digest input: both sides of a verification
/// must produce it character-for-character.
pub fn encode_type(primary_type: &str, schema: &TypedSchema) -> String {
    let mut out = String::with_capacity(primary_type.len() + 2 + schema.len() * 16);
    out.push_str(primary_type);
    out.push('(');
    for (i, (name, ty)) in schema.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(ty.type_name());
        out.push(' ');
        out.push_str(name);
    }
    out.push(')');
    out
}

/// `keccak256(encodeType)` — the first word of every struct hash.
pub fn type_hash(primary_type: &str, schema: &TypedSchema) -> [u8; 32] {
    keccak256(encode_type(primary_type, schema).as_bytes())
}

/// Encode one value as its 32-byte data word.
fn encode_word(value: &FieldValue) -> [u8; 32] {
    match value {
        // Dynamic type: the word is the hash of the contents.
        FieldValue::String(s) => keccak256(s.as_bytes()),
        FieldValue::Address(address) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(address.as_bytes());
            word
        }
        FieldValue::Bytes32(bytes) => *bytes,
        FieldValue::Uint(n) => {
            let mut word = [0u8; 32];
            word[16..].copy_from_slice(&n.to_be_bytes());
            word
        }
    }
}

/// `hashStruct`: keccak-256 over the type hash followed by each value
/// word in schema order.
pub fn hash_struct(
    primary_type: &str,
    schema: &TypedSchema,
    values: &[(String, FieldValue)],
) -> [u8; 32] {
    let mut segments: Vec<[u8; 32]> = Vec::with_capacity(1 + values.len());
    segments.push(type_hash(primary_type, schema));
    for (_, value) in values {
        segments.push(encode_word(value));
    }
    let refs: Vec<&[u8]> = segments.iter().map(|w| w.as_slice()).collect();
    keccak256_concat(&refs)
}

/// The domain separator: `hashStruct` of the fixed two-field domain type.
///
/// Computed from [`DOMAIN_TYPE`] directly rather than re-deriving the
/// type string, so the canonical encoding has exactly one source of truth.
pub fn domain_separator(domain: &Domain) -> [u8; 32] {
    let mut chain_word = [0u8; 32];
    chain_word[24..].copy_from_slice(&domain.ledger_id.to_be_bytes());

    let mut authority_word = [0u8; 32];
    authority_word[12..].copy_from_slice(domain.verifying_authority.as_bytes());

    keccak256_concat(&[&keccak256(DOMAIN_TYPE.as_bytes()), &chain_word, &authority_word])
}

/// The final 32-byte signing digest of a typed message.
///
/// Deterministic: identical inputs always produce an identical digest,
/// and any change to a field value, the field order, the ledger id, or
/// the verifying authority changes it.
pub fn digest(message: &TypedMessage) -> [u8; 32] {
    let domain_hash = domain_separator(message.domain());
    let message_hash = hash_struct(message.primary_type(), message.schema(), message.values());
    keccak256_concat(&[&TYPED_DATA_PREFIX, &domain_hash, &message_hash])
}
