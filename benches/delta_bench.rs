//! Benchmarks for chunkdiff.
//!
//! Run with:
//!     cargo bench

use std::io::Cursor;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use chunkdiff::{ChunkConfig, Chunker, DeltaGenerator, LocalIndex, build_tree};

/// Deterministic pseudo-random data.
fn noise(len: usize) -> Vec<u8> {
    let mut seed = 0x2545_F491_4F6C_DD1Du64;
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed as u8
        })
        .collect()
}

fn bench_chunker(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunker");

    for size in [1024 * 1024, 10 * 1024 * 1024] {
        let data = noise(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            format!("random_{}mb", size / (1024 * 1024)),
            &data,
            |b, data| {
                b.iter(|| {
                    let chunker = Chunker::new(ChunkConfig::default());
                    let chunks = chunker.chunk_bytes(black_box(data.clone()));
                    black_box(chunks.len())
                });
            },
        );

        // All zeros: every cut is forced at max_size
        let zeros = vec![0u8; size];
        group.bench_with_input(
            format!("zeros_{}mb", size / (1024 * 1024)),
            &zeros,
            |b, data| {
                b.iter(|| {
                    let chunker = Chunker::new(ChunkConfig::default());
                    let chunks = chunker.chunk_bytes(black_box(data.clone()));
                    black_box(chunks.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    let size = 4 * 1024 * 1024;
    let data = noise(size);

    group.throughput(Throughput::Bytes(size as u64));
    for (name, fanout_bits) in [("fanout_4", 2), ("fanout_16", 4), ("fanout_256", 8)] {
        let config = ChunkConfig::default().with_fanout_bits(fanout_bits);
        group.bench_function(name, |b| {
            b.iter(|| {
                let tree = build_tree(Cursor::new(black_box(&data)), config).unwrap();
                black_box(tree.roots().len())
            });
        });
    }

    group.finish();
}

fn bench_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta");
    let size = 4 * 1024 * 1024;
    let config = ChunkConfig::default();

    let original = noise(size);
    let index = LocalIndex::build(&build_tree(Cursor::new(&original), config).unwrap()).unwrap();

    // One small edit every 256 KiB
    let mut edited = original.clone();
    for offset in (0..size).step_by(256 * 1024) {
        edited[offset] ^= 0xFF;
    }

    group.throughput(Throughput::Bytes(size as u64));
    for (name, modified) in [("identical", &original), ("sparse_edits", &edited)] {
        group.bench_function(name, |b| {
            let generator = DeltaGenerator::new(config).unwrap();
            b.iter(|| {
                let delta = generator
                    .generate(Cursor::new(black_box(modified)), &index)
                    .unwrap();
                black_box(delta.stats.copy_bytes)
            });
        });
    }

    group.bench_function("index_build", |b| {
        let tree = build_tree(Cursor::new(&original), config).unwrap();
        b.iter(|| black_box(LocalIndex::build(black_box(&tree)).unwrap().len()));
    });

    group.finish();
}

criterion_group!(benches, bench_chunker, bench_tree, bench_delta);
criterion_main!(benches);
