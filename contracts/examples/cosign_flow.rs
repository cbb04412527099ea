//! Walkthrough of the full QUILL co-signing lifecycle.
//!
//! Creates a document requiring four signatures, collects them directly
//! and through a relayed typed-data authorization, revokes one, and
//! finishes with a dual-signature KYC profile registration.
//!
//! Run with:
//!   cargo run --example cosign_flow

use std::collections::HashMap;

use quill_contracts::documents::DocumentRegistry;
use quill_contracts::meta;
use quill_contracts::profiles::ProfileRegistry;
use quill_protocol::crypto::{ContentHash, LedgerAddress, QuillKeypair};
use quill_protocol::typed_data::{profile_content_hash, Domain};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

const HEIGHT: u64 = 1_000;
const FOREVER: u64 = u64::MAX;

fn step(title: &str) {
    println!("\n{}== {} =={}", BOLD, title, RESET);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    step("Setup");
    let authority: LedgerAddress = "0x00000000000000000000000000000000000000aa"
        .parse()
        .expect("static address");
    let domain = Domain::devnet(authority);
    let mut documents = DocumentRegistry::new(domain);

    let signers: Vec<QuillKeypair> = (0..4).map(|_| QuillKeypair::generate()).collect();
    for (i, signer) in signers.iter().enumerate() {
        println!("  signer {}: {}", i + 1, signer.address());
    }

    step("Create document");
    let document = ContentHash::digest(b"Hello World!");
    let event = documents
        .create_document(
            document,
            signers.iter().map(|k| k.address()).collect(),
            true,
        )
        .expect("fresh hash");
    println!("  {}\u{2713}{} {}", GREEN, RESET, event);
    println!(
        "  {}fully signed: {}{}",
        DIM,
        documents.is_fully_signed(&document, HEIGHT),
        RESET
    );

    step("Three signers sign directly");
    for signer in &signers[..3] {
        let event = documents
            .sign_document(signer.address(), document, FOREVER, HEIGHT)
            .expect("required signer");
        println!("  {}\u{2713}{} {}", GREEN, RESET, event);
    }
    println!(
        "  {}fully signed: {}{}",
        DIM,
        documents.is_fully_signed(&document, HEIGHT),
        RESET
    );

    step("Fourth signature arrives through a relayer");
    let remote = &signers[3];
    let nonce = documents.nonce_of(&remote.address());
    let digest = meta::sign_document_digest(domain, remote.address(), document, FOREVER, nonce);
    let authorization = remote.sign_prehash(&digest).expect("valid key");
    println!(
        "  {}signer is offline; relayer submits their authorization{}",
        YELLOW, RESET
    );
    let event = documents
        .sign_document_authorized(
            remote.address(),
            document,
            FOREVER,
            nonce,
            &authorization,
            HEIGHT,
        )
        .expect("valid authorization");
    println!("  {}\u{2713}{} {}", GREEN, RESET, event);
    println!(
        "  {}fully signed: {}{}",
        DIM,
        documents.is_fully_signed(&document, HEIGHT),
        RESET
    );

    step("Signer 1 withdraws");
    let event = documents
        .revoke_document_signature(signers[0].address(), document)
        .expect("revocable document");
    println!("  {}\u{2713}{} {}", GREEN, RESET, event);
    println!(
        "  {}fully signed: {}{}",
        DIM,
        documents.is_fully_signed(&document, HEIGHT),
        RESET
    );

    step("KYC profile registration");
    let admin = LedgerAddress::new([0xad; 20]);
    let mut profiles = ProfileRegistry::new(admin);
    let validator = QuillKeypair::generate();
    profiles
        .register_validator(admin, validator.address())
        .expect("owner call");

    let holder = &signers[0];
    let form = HashMap::from([
        ("name".to_owned(), "Ada Lovelace".to_owned()),
        ("ethereumAddress".to_owned(), holder.address().to_string()),
        ("organizationName".to_owned(), "Analytical Engines Ltd".to_owned()),
    ]);
    let content_hash = profile_content_hash(domain, &form);
    let owner_signature = holder.sign_prehash(content_hash.as_bytes()).expect("valid key");
    let validator_signature = validator
        .sign_prehash(content_hash.as_bytes())
        .expect("valid key");

    let event = profiles
        .register_profile(
            validator.address(),
            holder.address(),
            content_hash,
            owner_signature,
            validator_signature,
        )
        .expect("dual attestation");
    println!("  {}\u{2713}{} {}", GREEN, RESET, event);

    step("Event journals");
    println!("  document registry emitted {} events:", documents.events().len());
    for event in documents.events() {
        println!("    {}• {}{}", DIM, event, RESET);
    }
    println!("  profile registry emitted {} events:", profiles.events().len());
    for event in profiles.events() {
        println!("    {}• {}{}", DIM, event, RESET);
    }
}
