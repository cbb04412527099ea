//! Cross-implementation digest vectors and end-to-end signing flows.
//!
//! The typed-data digest must be bit-exact reproducible by the host
//! ledger and by every wallet implementation that signs for QUILL. These
//! tests pin independently computed V4 vectors and prove the full
//! construct → hash → sign → recover pipeline composes, with each test
//! standing alone — no shared state, no ordering dependencies.

use std::collections::HashMap;

use quill_protocol::crypto::{keccak256, recover_address, verify, LedgerAddress, QuillKeypair};
use quill_protocol::typed_data::{
    digest, domain_separator, Domain, FieldType, FieldValue, TypedMessage, TypedSchema,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn authority() -> LedgerAddress {
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap()
}

fn sign_document_schema() -> TypedSchema {
    TypedSchema::new([
        ("signer", FieldType::Address),
        ("hash", FieldType::Bytes32),
        ("validUntil", FieldType::Uint256),
        ("nonce", FieldType::Uint256),
    ])
}

fn sign_document_payload() -> HashMap<String, FieldValue> {
    HashMap::from([
        (
            "signer".to_owned(),
            FieldValue::Address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()),
        ),
        (
            "hash".to_owned(),
            FieldValue::Bytes32(keccak256(b"Hello World!")),
        ),
        ("validUntil".to_owned(), FieldValue::from(u64::MAX)),
        ("nonce".to_owned(), FieldValue::from(0u64)),
    ])
}

// ---------------------------------------------------------------------------
// Pinned vectors
// ---------------------------------------------------------------------------

#[test]
fn devnet_domain_separator_vector() {
    let separator = domain_separator(&Domain::new(31_337, authority()));
    assert_eq!(
        hex::encode(separator),
        "f886dcd7e2e094c775045dd62a9b549437796d5236eaf29ff9aa79afa910df49"
    );
}

#[test]
fn sign_document_digest_vector() {
    // Computed with an independent structured-data V4 implementation
    // over the same domain, schema, and payload. A change here is a
    // consensus break, not a refactor.
    let message = TypedMessage::build(
        Domain::new(31_337, authority()),
        "SignDocument",
        sign_document_schema(),
        sign_document_payload(),
    )
    .unwrap();
    assert_eq!(
        hex::encode(digest(&message)),
        "d52d57cf29387fdb31c9e6dafdb5ddfe97c13b43a2e55b0165f270802e47c547"
    );
}

// ---------------------------------------------------------------------------
// End-to-end: construct, hash, sign, recover
// ---------------------------------------------------------------------------

#[test]
fn wallet_roundtrip_over_typed_digest() {
    let keypair = QuillKeypair::generate();
    let message = TypedMessage::build(
        Domain::new(31_337, authority()),
        "SignDocument",
        sign_document_schema(),
        sign_document_payload(),
    )
    .unwrap();

    let digest = digest(&message);
    let signature = keypair.sign_prehash(&digest).unwrap();

    assert_eq!(recover_address(&digest, &signature).unwrap(), keypair.address());
    assert!(verify(&digest, &signature, &keypair.address()));
}

#[test]
fn signature_is_bound_to_one_domain() {
    let keypair = QuillKeypair::generate();

    let build = |ledger_id: u64| {
        TypedMessage::build(
            Domain::new(ledger_id, authority()),
            "SignDocument",
            sign_document_schema(),
            sign_document_payload(),
        )
        .unwrap()
    };

    let devnet_digest = digest(&build(31_337));
    let mainnet_digest = digest(&build(1));
    let signature = keypair.sign_prehash(&devnet_digest).unwrap();

    assert!(verify(&devnet_digest, &signature, &keypair.address()));
    // The identical message on another ledger hashes differently, so the
    // signature does not transfer.
    assert!(!verify(&mainnet_digest, &signature, &keypair.address()));
}

#[test]
fn sign_request_json_carries_everything_a_wallet_needs() {
    let message = TypedMessage::build(
        Domain::new(31_337, authority()),
        "SignDocument",
        sign_document_schema(),
        sign_document_payload(),
    )
    .unwrap();

    let request = message.to_sign_request();
    assert_eq!(request["primaryType"], "SignDocument");
    assert_eq!(
        request["domain"]["verifyingContract"],
        authority().to_string()
    );
    let fields = request["types"]["SignDocument"].as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0]["name"], "signer");
    assert_eq!(fields[0]["type"], "address");
}
