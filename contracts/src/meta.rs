//! Typed messages for relayed (meta-transaction) actions.
//!
//! A signer who doesn't want to submit a ledger transaction signs one of
//! these messages instead and hands the signature to a relayer. The
//! builders here are shared by both sides of that exchange: wallets call
//! them to construct exactly what the registry will verify, and
//! [`DocumentRegistry`](crate::documents::DocumentRegistry) calls them to
//! recompute the digest during authorization. One implementation, zero
//! drift.
//!
//! The two actions use distinct primary type names on purpose: a
//! signature over `SignDocument` can never be replayed to authorize a
//! `RevokeDocumentSignature`, or vice versa.

use quill_protocol::config::{REVOKE_SIGNATURE_TYPE_NAME, SIGN_DOCUMENT_TYPE_NAME};
use quill_protocol::crypto::{ContentHash, LedgerAddress};
use quill_protocol::typed_data::{
    digest, Domain, FieldType, FieldValue, TypedMessage, TypedSchema,
};

/// Schema of the document-signing meta-action:
/// `SignDocument(address signer,bytes32 hash,uint256 validUntil,uint256 nonce)`.
pub fn sign_document_schema() -> TypedSchema {
    TypedSchema::new([
        ("signer", FieldType::Address),
        ("hash", FieldType::Bytes32),
        ("validUntil", FieldType::Uint256),
        ("nonce", FieldType::Uint256),
    ])
}

/// Schema of the revocation meta-action:
/// `RevokeDocumentSignature(address signer,bytes32 hash,uint256 nonce)`.
pub fn revoke_signature_schema() -> TypedSchema {
    TypedSchema::new([
        ("signer", FieldType::Address),
        ("hash", FieldType::Bytes32),
        ("nonce", FieldType::Uint256),
    ])
}

/// The typed message a signer authorizes to sign a document remotely.
pub fn sign_document_message(
    domain: Domain,
    signer: LedgerAddress,
    hash: ContentHash,
    valid_until: u64,
    nonce: u64,
) -> TypedMessage {
    TypedMessage::from_parts(
        domain,
        SIGN_DOCUMENT_TYPE_NAME,
        sign_document_schema(),
        vec![
            ("signer".to_owned(), FieldValue::Address(signer)),
            ("hash".to_owned(), FieldValue::Bytes32(hash.to_bytes())),
            ("validUntil".to_owned(), FieldValue::from(valid_until)),
            ("nonce".to_owned(), FieldValue::from(nonce)),
        ],
    )
}

/// The digest of [`sign_document_message`] — what the wallet signs and
/// the registry recovers against.
pub fn sign_document_digest(
    domain: Domain,
    signer: LedgerAddress,
    hash: ContentHash,
    valid_until: u64,
    nonce: u64,
) -> [u8; 32] {
    digest(&sign_document_message(domain, signer, hash, valid_until, nonce))
}

/// The typed message a signer authorizes to revoke their signature remotely.
pub fn revoke_signature_message(
    domain: Domain,
    signer: LedgerAddress,
    hash: ContentHash,
    nonce: u64,
) -> TypedMessage {
    TypedMessage::from_parts(
        domain,
        REVOKE_SIGNATURE_TYPE_NAME,
        revoke_signature_schema(),
        vec![
            ("signer".to_owned(), FieldValue::Address(signer)),
            ("hash".to_owned(), FieldValue::Bytes32(hash.to_bytes())),
            ("nonce".to_owned(), FieldValue::from(nonce)),
        ],
    )
}

/// The digest of [`revoke_signature_message`].
pub fn revoke_signature_digest(
    domain: Domain,
    signer: LedgerAddress,
    hash: ContentHash,
    nonce: u64,
) -> [u8; 32] {
    digest(&revoke_signature_message(domain, signer, hash, nonce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_protocol::typed_data::encode_type;

    fn domain() -> Domain {
        Domain::devnet("0x00000000000000000000000000000000000000aa".parse().unwrap())
    }

    fn signer() -> LedgerAddress {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    #[test]
    fn canonical_type_strings() {
        assert_eq!(
            encode_type(SIGN_DOCUMENT_TYPE_NAME, &sign_document_schema()),
            "SignDocument(address signer,bytes32 hash,uint256 validUntil,uint256 nonce)"
        );
        assert_eq!(
            encode_type(REVOKE_SIGNATURE_TYPE_NAME, &revoke_signature_schema()),
            "RevokeDocumentSignature(address signer,bytes32 hash,uint256 nonce)"
        );
    }

    #[test]
    fn sign_and_revoke_digests_never_collide() {
        // Same signer, same document, same nonce — different action,
        // different digest. This is the cross-action replay guard.
        let hash = ContentHash::digest(b"doc");
        let sign = sign_document_digest(domain(), signer(), hash, u64::MAX, 0);
        let revoke = revoke_signature_digest(domain(), signer(), hash, 0);
        assert_ne!(sign, revoke);
    }

    #[test]
    fn digest_binds_every_field() {
        let hash = ContentHash::digest(b"doc");
        let base = sign_document_digest(domain(), signer(), hash, 100, 0);
        assert_ne!(base, sign_document_digest(domain(), signer(), hash, 100, 1));
        assert_ne!(base, sign_document_digest(domain(), signer(), hash, 101, 0));
        assert_ne!(
            base,
            sign_document_digest(domain(), signer(), ContentHash::digest(b"other"), 100, 0)
        );
    }

    #[test]
    fn digest_binds_the_domain() {
        let hash = ContentHash::digest(b"doc");
        let devnet = sign_document_digest(domain(), signer(), hash, 100, 0);
        let mainnet = sign_document_digest(
            Domain::new(1, domain().verifying_authority),
            signer(),
            hash,
            100,
            0,
        );
        assert_ne!(devnet, mainnet);
    }
}
