// Hashing and signature benchmarks for the QUILL protocol.
//
// Covers Keccak-256 at payload sizes, typed-data digest assembly,
// keypair generation, prehash signing, and address recovery — the whole
// hot path of a relayed authorization.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;

use quill_protocol::crypto::{keccak256, recover_address, QuillKeypair};
use quill_protocol::typed_data::{digest, Domain, FieldType, FieldValue, TypedMessage, TypedSchema};

fn sample_message() -> TypedMessage {
    let schema = TypedSchema::new([
        ("signer", FieldType::Address),
        ("hash", FieldType::Bytes32),
        ("validUntil", FieldType::Uint256),
        ("nonce", FieldType::Uint256),
    ]);
    let payload = HashMap::from([
        (
            "signer".to_owned(),
            FieldValue::Address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()),
        ),
        (
            "hash".to_owned(),
            FieldValue::Bytes32(keccak256(b"Hello World!")),
        ),
        ("validUntil".to_owned(), FieldValue::from(u64::MAX)),
        ("nonce".to_owned(), FieldValue::from(42u64)),
    ]);
    TypedMessage::build(
        Domain::new(
            31_337,
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
        ),
        "SignDocument",
        schema,
        payload,
    )
    .unwrap()
}

fn bench_keccak256(c: &mut Criterion) {
    let mut group = c.benchmark_group("keccak256");
    for size in [32usize, 256, 4_096, 65_536] {
        let data = vec![0xABu8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| keccak256(data));
        });
    }
    group.finish();
}

fn bench_typed_data_digest(c: &mut Criterion) {
    let message = sample_message();
    c.bench_function("typed_data/digest", |b| {
        b.iter(|| digest(&message));
    });
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("secp256k1/keypair_generate", |b| {
        b.iter(QuillKeypair::generate);
    });
}

fn bench_sign_prehash(c: &mut Criterion) {
    let keypair = QuillKeypair::generate();
    let prehash = digest(&sample_message());
    c.bench_function("secp256k1/sign_prehash", |b| {
        b.iter(|| keypair.sign_prehash(&prehash).unwrap());
    });
}

fn bench_recover_address(c: &mut Criterion) {
    let keypair = QuillKeypair::generate();
    let prehash = digest(&sample_message());
    let signature = keypair.sign_prehash(&prehash).unwrap();
    c.bench_function("secp256k1/recover_address", |b| {
        b.iter(|| recover_address(&prehash, &signature).unwrap());
    });
}

criterion_group!(
    benches,
    bench_keccak256,
    bench_typed_data_digest,
    bench_keypair_generation,
    bench_sign_prehash,
    bench_recover_address
);
criterion_main!(benches);
