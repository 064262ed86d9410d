//! Resolution hot path benchmarks.
//!
//! Covers the mixing and collapse of a single observation and a full
//! commit → reveal cycle through the controller.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use superposition::entropy::{binary_collapse, combine, keccak, MixInputs};
use superposition::{
    Address, Controller, Hash32, InMemoryLedger, MockOracle, ProtocolConfig, Token,
};

fn sample_inputs() -> MixInputs {
    MixInputs {
        commit_linked_randomness: Hash32::from_low_u64(1),
        current_mix_in: Hash32::from_low_u64(2),
        recent_block_randomness: Hash32::from_low_u64(3),
        timestamp: 1_700_000_000,
        block_index: 1_006,
        chain_id: 1,
        account: Address::repeat(0xa1),
        user_entropy: Hash32::from_low_u64(4),
        data_hash: keccak(b"bench"),
        ref_block: 1_000,
        entropy_snapshot: Hash32::from_low_u64(5),
        current_pool: Hash32::from_low_u64(6),
    }
}

fn bench_mixing(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse/mix");
    let inputs = sample_inputs();

    group.bench_function("combine", |b| b.iter(|| combine(black_box(&inputs))));

    let mixed = combine(&inputs);
    group.bench_function("binary_collapse", |b| {
        b.iter(|| {
            binary_collapse(
                black_box(1_000_000),
                black_box(&mixed),
                &inputs.data_hash,
                &inputs.user_entropy,
            )
        })
    });

    group.bench_function("keccak_256_bytes", |b| {
        let data = [0x42u8; 256];
        b.iter(|| keccak(black_box(&data)))
    });

    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let controller_id = Address::repeat(0xc0);
    let alice = Address::repeat(0xa1);
    let secret = Hash32::from_low_u64(0x5eed);

    c.bench_function("collapse/commit_reveal", |b| {
        b.iter_batched(
            || {
                let mut ledger = InMemoryLedger::new(controller_id);
                ledger
                    .credit(Token::Superposed, &alice, 1_000)
                    .expect("credit");
                Controller::deploy(
                    ProtocolConfig::default(),
                    Address::repeat(0xde),
                    controller_id,
                    MockOracle::default(),
                    ledger,
                )
                .expect("deploy")
            },
            |mut controller| {
                controller
                    .commit(&alice, 100, keccak(b"bench"), secret)
                    .expect("commit");
                controller.oracle_mut().advance(6);
                controller
                    .reveal(&alice, b"bench", secret)
                    .expect("reveal")
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mixing, bench_lifecycle);
criterion_main!(benches);
