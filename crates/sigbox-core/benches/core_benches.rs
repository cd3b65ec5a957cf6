//! Criterion benchmarks for sigbox-core critical operations.
//!
//! Covers: discrete-log prove/verify, transaction id hashing, and
//! address encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::OsRng;

use sigbox_core::address::Address;
use sigbox_core::constants::NetworkType;
use sigbox_core::crypto::{DlogProof, PrivateInput};
use sigbox_core::types::{
    BoxCandidate, BoxId, Hash256, Proposition, UnsignedInput, UnsignedTransaction,
};

fn sample_transaction(pk: &PrivateInput) -> UnsignedTransaction {
    UnsignedTransaction {
        inputs: (0..4u8)
            .map(|i| UnsignedInput {
                box_id: BoxId(Hash256([i; 32])),
            })
            .collect(),
        outputs: vec![
            BoxCandidate {
                value: 25_000_000,
                proposition: Proposition::ProveDlog(pk.public_image()),
                creation_height: 32_987,
            },
            BoxCandidate {
                value: 1_000_000,
                proposition: Proposition::fee(),
                creation_height: 32_987,
            },
        ],
    }
}

fn bench_dlog(c: &mut Criterion) {
    let sk = PrivateInput::random(&mut OsRng);
    let pk = sk.public_image();
    let msg = sample_transaction(&sk).bytes_to_sign();
    let proof = DlogProof::prove(&sk, &msg, &mut OsRng);

    c.bench_function("dlog_prove", |b| {
        b.iter(|| DlogProof::prove(black_box(&sk), black_box(&msg), &mut OsRng))
    });
    c.bench_function("dlog_verify", |b| {
        b.iter(|| black_box(&proof).verify(black_box(&pk), black_box(&msg)))
    });
}

fn bench_tx_id(c: &mut Criterion) {
    let sk = PrivateInput::random(&mut OsRng);
    let tx = sample_transaction(&sk);
    c.bench_function("unsigned_tx_id", |b| b.iter(|| black_box(&tx).id()));
}

fn bench_address(c: &mut Criterion) {
    let pk = PrivateInput::random(&mut OsRng).public_image();
    let addr = Address::p2pk(pk, NetworkType::Mainnet);
    let encoded = addr.encode();
    c.bench_function("address_encode", |b| b.iter(|| black_box(&addr).encode()));
    c.bench_function("address_decode", |b| {
        b.iter(|| Address::decode(black_box(&encoded)))
    });
}

criterion_group!(benches, bench_dlog, bench_tx_id, bench_address);
criterion_main!(benches);
