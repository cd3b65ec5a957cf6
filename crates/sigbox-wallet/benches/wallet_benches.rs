//! Criterion benchmarks for sigbox-wallet.
//!
//! Covers: master key derivation, payment building, single-key proving
//! and JSON encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sigbox_core::constants::NetworkType;
use sigbox_core::traits::UtxoSet;
use sigbox_core::types::{BoxCandidate, BoxId, Hash256, LedgerBox};
use sigbox_wallet::{encoder, derive_master_key, Prover, TransactionBuilder, TxParams};

const INPUTS: u8 = 8;

fn setup() -> (sigbox_wallet::ExtendedSecretKey, UtxoSet, TxParams) {
    let key = derive_master_key(&[7u8; 32]).unwrap();
    let owner = key.address(NetworkType::Mainnet);
    let recipient = derive_master_key(&[8u8; 32])
        .unwrap()
        .address(NetworkType::Mainnet);
    let mut utxos = UtxoSet::new();
    let ids: Vec<BoxId> = (0..INPUTS)
        .map(|i| {
            utxos.insert(LedgerBox {
                candidate: BoxCandidate {
                    value: 10_000_000,
                    proposition: owner.to_proposition(),
                    creation_height: 1,
                },
                transaction_id: Hash256([i; 32]),
                index: 0,
            })
        })
        .collect();
    let total = 10_000_000 * INPUTS as u64;
    let params = TxParams::new(recipient, owner, total - 1_020_000, 1_000_000, 20_000, ids, 100)
        .unwrap();
    (key, utxos, params)
}

fn bench_derive(c: &mut Criterion) {
    c.bench_function("derive_master_key", |b| {
        b.iter(|| derive_master_key(black_box(&[1u8; 32])))
    });
}

fn bench_build(c: &mut Criterion) {
    let (_, utxos, params) = setup();
    let builder = TransactionBuilder::new();
    c.bench_function("payment_transaction_8_inputs", |b| {
        b.iter(|| builder.payment_transaction(black_box(&params), &utxos))
    });
}

fn bench_prove(c: &mut Criterion) {
    let (key, utxos, params) = setup();
    let draft = TransactionBuilder::new()
        .payment_transaction(&params, &utxos)
        .unwrap();
    c.bench_function("prove_8_inputs", |b| {
        b.iter(|| Prover::prove(black_box(&draft), key.private_input()))
    });
}

fn bench_encode(c: &mut Criterion) {
    let (key, utxos, params) = setup();
    let draft = TransactionBuilder::new()
        .payment_transaction(&params, &utxos)
        .unwrap();
    let signed = Prover::prove(&draft, key.private_input()).unwrap();
    c.bench_function("to_json", |b| b.iter(|| encoder::to_json(black_box(&signed))));
    c.bench_function("to_bytes", |b| b.iter(|| encoder::to_bytes(black_box(&signed))));
}

criterion_group!(benches, bench_derive, bench_build, bench_prove, bench_encode);
criterion_main!(benches);
