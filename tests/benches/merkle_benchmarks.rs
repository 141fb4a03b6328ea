//! # Snapshot Tree Benchmarks
//!
//! | Operation | Leaves |
//! |-----------|--------|
//! | build (commitment + sorted leaves) | 10 .. 10,000 |
//! | proof for the last leaf | 10 .. 10,000 |
//! | verify | 10 .. 10,000 |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bridge_crypto::{chain_range_commitment, keccak256, leaf_hash, merkle};
use bridge_types::{ChainRange, Hash};

const SIZES: [usize; 4] = [10, 100, 1_000, 10_000];

fn sample_leaves(count: usize) -> Vec<Hash> {
    let chains = [
        ChainRange::new("vechain", "0x4a", 0, 100_000).unwrap(),
        ChainRange::new("ethereum", "1", 0, 50_000).unwrap(),
    ];
    let app = [0xA1u8; 32];
    let tail = (0..count as u64)
        .map(|i| leaf_hash(&app, &keccak256(&i.to_be_bytes())))
        .collect();
    merkle::snapshot_leaves(chain_range_commitment(&chains), tail)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot-tree-build");
    for size in SIZES {
        let leaves = sample_leaves(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &leaves, |b, leaves| {
            b.iter(|| black_box(merkle::build(leaves).root()))
        });
    }
    group.finish();
}

fn bench_prove_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot-tree-proof");
    for size in SIZES {
        let leaves = sample_leaves(size);
        let tree = merkle::build(&leaves);
        let root = tree.root();
        let target = leaves[leaves.len() - 1];
        let proof = tree.proof(&target).unwrap();

        group.bench_with_input(BenchmarkId::new("proof", size), &target, |b, leaf| {
            b.iter(|| black_box(tree.proof(leaf).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("verify", size), &proof, |b, proof| {
            b.iter(|| black_box(merkle::verify(&target, &root, proof)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_prove_and_verify);
criterion_main!(benches);
