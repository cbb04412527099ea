//! The KYC signer-profile schema.
//!
//! A signer profile is a fixed, ordered list of seven string fields
//! describing the person (or organization) behind a ledger address. The
//! profile payload itself never touches a ledger — only its typed-data
//! digest does, as the `content_hash` both the owner and a validator
//! sign during registration.
//!
//! Two construction modes:
//!
//! - [`profile_message`] is the *collaborator* path used by forms and
//!   CLI tooling: absent fields default to the empty string, extra keys
//!   are dropped. A half-filled form still hashes.
//! - The strict path is [`TypedMessage::build`] with
//!   [`signer_profile_schema`], which rejects missing fields like any
//!   other schema. Registries and verifiers use this one.

use std::collections::HashMap;

use super::hashing::digest;
use super::message::{Domain, TypedMessage};
use super::schema::{FieldType, FieldValue, TypedSchema};
use crate::config::{SIGNER_PROFILE_FIELDS, SIGNER_PROFILE_TYPE_NAME};
use crate::crypto::hash::ContentHash;

/// The fixed seven-field, all-string profile schema, in canonical order.
pub fn signer_profile_schema() -> TypedSchema {
    TypedSchema::new(
        SIGNER_PROFILE_FIELDS
            .iter()
            .map(|name| (*name, FieldType::String)),
    )
}

/// Build a `SignerProfile` typed message from whatever subset of fields
/// the collaborator collected.
///
/// Fields absent from `data` become empty strings; keys outside the
/// fixed schema are ignored. The result is always schema-complete, so
/// construction cannot fail.
pub fn profile_message(domain: Domain, data: &HashMap<String, String>) -> TypedMessage {
    let values = SIGNER_PROFILE_FIELDS
        .iter()
        .map(|name| {
            let value = data.get(*name).cloned().unwrap_or_default();
            ((*name).to_owned(), FieldValue::String(value))
        })
        .collect();
    TypedMessage::from_parts(
        domain,
        SIGNER_PROFILE_TYPE_NAME,
        signer_profile_schema(),
        values,
    )
}

/// The content hash of a profile: the typed-data digest of its message.
///
/// This is the 32-byte value a profile owner and a validator both sign,
/// and the value stored by the profile registry.
pub fn profile_content_hash(domain: Domain, data: &HashMap<String, String>) -> ContentHash {
    ContentHash::new(digest(&profile_message(domain, data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_data::message::TypedDataError;

    fn domain() -> Domain {
        Domain::devnet("0x00000000000000000000000000000000000000aa".parse().unwrap())
    }

    fn full_profile() -> HashMap<String, String> {
        SIGNER_PROFILE_FIELDS
            .iter()
            .map(|f| ((*f).to_owned(), format!("value of {}", f)))
            .collect()
    }

    #[test]
    fn schema_field_order_is_fixed() {
        let schema = signer_profile_schema();
        let names: Vec<&str> = schema.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, SIGNER_PROFILE_FIELDS);
    }

    #[test]
    fn absent_fields_default_to_empty_string() {
        let sparse = HashMap::from([("name".to_owned(), "Ada Lovelace".to_owned())]);
        let message = profile_message(domain(), &sparse);
        assert_eq!(message.values().len(), SIGNER_PROFILE_FIELDS.len());
        let gov_id = &message.values()[2].1;
        assert_eq!(*gov_id, FieldValue::String(String::new()));
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let mut data = full_profile();
        data.insert("favoriteColor".to_owned(), "mauve".to_owned());
        let message = profile_message(domain(), &data);
        assert!(message.values().iter().all(|(n, _)| n != "favoriteColor"));
    }

    #[test]
    fn content_hash_is_deterministic_and_field_sensitive() {
        let baseline = profile_content_hash(domain(), &full_profile());
        assert_eq!(baseline, profile_content_hash(domain(), &full_profile()));

        let mut altered = full_profile();
        altered.insert("govID".to_owned(), "something else".to_owned());
        assert_ne!(baseline, profile_content_hash(domain(), &altered));
    }

    #[test]
    fn empty_form_still_hashes() {
        // A completely blank profile is valid input for the collaborator
        // path — every field defaults to "".
        let blank = profile_content_hash(domain(), &HashMap::new());
        assert_ne!(blank, profile_content_hash(domain(), &full_profile()));
    }

    #[test]
    fn strict_mode_still_rejects_missing_fields() {
        // The collaborator path defaults; the codec proper does not.
        let sparse = HashMap::from([(
            "name".to_owned(),
            FieldValue::String("Ada Lovelace".to_owned()),
        )]);
        let err = TypedMessage::build(
            domain(),
            SIGNER_PROFILE_TYPE_NAME,
            signer_profile_schema(),
            sparse,
        )
        .unwrap_err();
        assert!(matches!(err, TypedDataError::SchemaMismatch { .. }));
    }
}
