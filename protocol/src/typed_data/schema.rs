//! Schema vocabulary for typed messages.
//!
//! A schema is an *ordered* list of named, typed fields. Order is not a
//! cosmetic detail: the canonical type encoding — and therefore every
//! digest and every signature — changes if two fields swap places.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::keys::LedgerAddress;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The value types a typed-data field can declare.
///
/// This is the subset the protocol's schemas actually use. All four map
/// directly onto structured-data atomic/dynamic types; nested structs and
/// arrays are deliberately unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// UTF-8 string, hashed (dynamic type) during encoding.
    String,
    /// 20-byte ledger address, left-padded to a 32-byte word.
    Address,
    /// Opaque 32-byte value, encoded as-is.
    Bytes32,
    /// Unsigned integer, big-endian in a 32-byte word.
    Uint256,
}

impl FieldType {
    /// The canonical type name as it appears in `encodeType` strings.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Address => "address",
            Self::Bytes32 => "bytes32",
            Self::Uint256 => "uint256",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A concrete value supplied for a schema field.
///
/// Every variant corresponds to exactly one [`FieldType`]; the codec
/// rejects payloads where the declared type and the supplied variant
/// disagree rather than coercing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A UTF-8 string.
    String(String),
    /// A ledger address.
    Address(LedgerAddress),
    /// A 32-byte value (content hashes, mostly).
    Bytes32([u8; 32]),
    /// An unsigned integer. `u128` covers every quantity the protocol
    /// encodes — nonces and ledger heights — with room to spare; the
    /// encoded form is still a full 32-byte word.
    Uint(u128),
}

impl FieldValue {
    /// The [`FieldType`] this value satisfies.
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::String(_) => FieldType::String,
            Self::Address(_) => FieldType::Address,
            Self::Bytes32(_) => FieldType::Bytes32,
            Self::Uint(_) => FieldType::Uint256,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<LedgerAddress> for FieldValue {
    fn from(address: LedgerAddress) -> Self {
        Self::Address(address)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Uint(n as u128)
    }
}

impl From<u128> for FieldValue {
    fn from(n: u128) -> Self {
        Self::Uint(n)
    }
}

// ---------------------------------------------------------------------------
// TypedSchema
// ---------------------------------------------------------------------------

/// An ordered sequence of `(name, type)` field declarations.
///
/// Field order is significant and part of the hash input. Schemas are
/// immutable once built; the protocol's own schemas are fixed constants
/// (see [`crate::config`]) and external collaborators construct theirs
/// once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSchema {
    fields: Vec<(String, FieldType)>,
}

impl TypedSchema {
    /// Build a schema from `(name, type)` pairs, preserving order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }

    /// The declared fields, in schema order.
    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
