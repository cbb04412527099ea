//! Typed-message construction and validation.
//!
//! A [`TypedMessage`] binds four things together: the domain it may be
//! verified in, a primary type name, the schema for that type, and a
//! payload satisfying the schema. Construction is the validation
//! boundary — once a `TypedMessage` exists, hashing cannot fail.

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use super::schema::{FieldType, FieldValue, TypedSchema};
use crate::config::{DOMAIN_TYPE_NAME, LEDGER_ID_DEVNET};
use crate::crypto::keys::LedgerAddress;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while validating a payload against its schema.
///
/// Both variants mean the caller supplied structurally invalid data;
/// nothing has been read from or written to any registry state when
/// they are raised.
#[derive(Debug, Error)]
pub enum TypedDataError {
    /// A field the schema requires is absent from the payload. Missing
    /// fields are invalid, not defaulted — default-filling is the
    /// presentation layer's business, and only for its own optional
    /// fields.
    #[error("schema mismatch: field '{field}' required by {type_name} is missing")]
    SchemaMismatch { type_name: String, field: String },

    /// A field is present but its value kind contradicts the declared type.
    #[error("schema mismatch: field '{field}' declares {declared} but the value is {supplied}")]
    FieldTypeMismatch {
        field: String,
        declared: FieldType,
        supplied: FieldType,
    },
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// The domain separator binding signatures to one registry deployment.
///
/// A signature over a message in domain `(ledger_id, verifying_authority)`
/// is meaningless in every other domain: a different registry instance, or
/// the same code deployed on a different ledger, computes a different
/// digest from identical message content. This is a correctness invariant,
/// not a convenience — drop either field and replay protection is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Domain {
    /// Network identifier of the host ledger.
    pub ledger_id: u64,
    /// Address of the registry instance entitled to verify signatures
    /// in this domain.
    pub verifying_authority: LedgerAddress,
}

impl Domain {
    /// Bind a domain to a ledger and a verifying registry address.
    pub const fn new(ledger_id: u64, verifying_authority: LedgerAddress) -> Self {
        Self {
            ledger_id,
            verifying_authority,
        }
    }

    /// A devnet domain for the given authority address.
    pub const fn devnet(verifying_authority: LedgerAddress) -> Self {
        Self::new(LEDGER_ID_DEVNET, verifying_authority)
    }

    /// The fixed domain-separator schema merged into every typed message.
    pub fn schema() -> TypedSchema {
        TypedSchema::new([
            ("chainId", FieldType::Uint256),
            ("verifyingContract", FieldType::Address),
        ])
    }
}

// ---------------------------------------------------------------------------
// TypedMessage
// ---------------------------------------------------------------------------

/// A validated, domain-bound structured message, ready for hashing and
/// for external wallet-style signing.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedMessage {
    domain: Domain,
    primary_type: String,
    schema: TypedSchema,
    /// Payload values in schema order. Populated only through validation
    /// (or the crate-internal constructor), so every schema field is
    /// guaranteed present and type-correct.
    values: Vec<(String, FieldValue)>,
}

impl TypedMessage {
    /// Validate `payload` against `schema` and build the message.
    ///
    /// Every schema field must be present with a matching value kind;
    /// unknown extra fields in the payload are ignored. The fixed
    /// domain-separator schema is carried alongside via [`Domain::schema`].
    ///
    /// # Errors
    ///
    /// [`TypedDataError::SchemaMismatch`] for an absent field,
    /// [`TypedDataError::FieldTypeMismatch`] for a wrongly-typed one.
    pub fn build(
        domain: Domain,
        primary_type: impl Into<String>,
        schema: TypedSchema,
        mut payload: HashMap<String, FieldValue>,
    ) -> Result<Self, TypedDataError> {
        let primary_type = primary_type.into();
        let mut values = Vec::with_capacity(schema.len());

        for (name, declared) in schema.fields() {
            let value = payload
                .remove(name)
                .ok_or_else(|| TypedDataError::SchemaMismatch {
                    type_name: primary_type.clone(),
                    field: name.clone(),
                })?;
            if value.field_type() != *declared {
                return Err(TypedDataError::FieldTypeMismatch {
                    field: name.clone(),
                    declared: *declared,
                    supplied: value.field_type(),
                });
            }
            values.push((name.clone(), value));
        }
        // Whatever remains in `payload` is extra and ignored.

        Ok(Self {
            domain,
            primary_type,
            schema,
            values,
        })
    }

    /// Constructor for payloads that are complete by construction — the
    /// protocol's own fixed schemas, where the values are assembled right
    /// next to the schema definition. Skips validation; hashing is
    /// well-defined for any inputs, so this trades a caller-error check
    /// for infallibility. General-purpose callers want [`build`](Self::build).
    pub fn from_parts(
        domain: Domain,
        primary_type: impl Into<String>,
        schema: TypedSchema,
        values: Vec<(String, FieldValue)>,
    ) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self {
            domain,
            primary_type: primary_type.into(),
            schema,
            values,
        }
    }

    /// The domain this message is bound to.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The primary type name.
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// The message schema (domain fields not included).
    pub fn schema(&self) -> &TypedSchema {
        &self.schema
    }

    /// The validated payload values, in schema order.
    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    /// Render the message in the JSON shape wallet tooling expects for
    /// structured-data signing: `types` (domain type merged in),
    /// `primaryType`, `domain`, and `message`.
    pub fn to_sign_request(&self) -> serde_json::Value {
        let type_entry = |schema: &TypedSchema| -> Vec<serde_json::Value> {
            schema
                .fields()
                .iter()
                .map(|(name, ty)| json!({ "name": name, "type": ty.type_name() }))
                .collect()
        };

        let message: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    FieldValue::String(s) => json!(s),
                    FieldValue::Address(a) => json!(a.to_string()),
                    FieldValue::Bytes32(b) => json!(format!("0x{}", hex::encode(b))),
                    FieldValue::Uint(n) => json!(n.to_string()),
                };
                (name.clone(), rendered)
            })
            .collect();

        let mut types = serde_json::Map::new();
        types.insert(DOMAIN_TYPE_NAME.to_owned(), json!(type_entry(&Domain::schema())));
        types.insert(self.primary_type.clone(), json!(type_entry(&self.schema)));

        json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": {
                "chainId": self.domain.ledger_id,
                "verifyingContract": self.domain.verifying_authority.to_string(),
            },
            "message": message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> LedgerAddress {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn agreement_schema() -> TypedSchema {
        TypedSchema::new([
            ("title", FieldType::String),
            ("counterparty", FieldType::Address),
            ("round", FieldType::Uint256),
        ])
    }

    fn full_payload() -> HashMap<String, FieldValue> {
        HashMap::from([
            ("title".to_owned(), FieldValue::from("Master Agreement")),
            ("counterparty".to_owned(), FieldValue::Address(authority())),
            ("round".to_owned(), FieldValue::from(3u64)),
        ])
    }

    #[test]
    fn build_accepts_complete_payload() {
        let message = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            full_payload(),
        )
        .unwrap();
        assert_eq!(message.values().len(), 3);
        assert_eq!(message.primary_type(), "Agreement");
    }

    #[test]
    fn build_orders_values_by_schema_not_payload() {
        let message = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            full_payload(),
        )
        .unwrap();
        let names: Vec<&str> = message.values().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["title", "counterparty", "round"]);
    }

    #[test]
    fn missing_field_is_schema_mismatch() {
        let mut payload = full_payload();
        payload.remove("round");
        let err = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            payload,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TypedDataError::SchemaMismatch { ref field, .. } if field == "round"
        ));
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        let mut payload = full_payload();
        payload.insert("round".to_owned(), FieldValue::from("three"));
        let err = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            payload,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TypedDataError::FieldTypeMismatch { ref field, .. } if field == "round"
        ));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut payload = full_payload();
        payload.insert("comment".to_owned(), FieldValue::from("ignore me"));
        let message = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            payload,
        )
        .unwrap();
        assert_eq!(message.values().len(), 3);
    }

    #[test]
    fn sign_request_has_wallet_shape() {
        let message = TypedMessage::build(
            Domain::devnet(authority()),
            "Agreement",
            agreement_schema(),
            full_payload(),
        )
        .unwrap();
        let request = message.to_sign_request();
        assert_eq!(request["primaryType"], "Agreement");
        assert_eq!(request["domain"]["chainId"], 31337);
        assert!(request["types"]["EIP712Domain"].is_array());
        assert_eq!(request["message"]["round"], "3");
    }
}
