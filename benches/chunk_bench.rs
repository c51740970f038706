//! Benchmarks for dedup-chunker.
//!
//! Run with:
//!     cargo bench

use std::sync::Arc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use dedup_chunker::{Algorithm, ChunkerConfig, ChunkerHandle, RayonPool, StreamChunker};

fn pseudo_random(len: usize) -> Vec<u8> {
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect()
}

fn chunk_count(config: ChunkerConfig, data: &[u8], push_size: usize) -> usize {
    let mut chunker = StreamChunker::new(config).unwrap();
    let mut count = 0;
    for buf in data.chunks(push_size) {
        count += chunker.push(buf).unwrap().len();
    }
    count + chunker.flush().unwrap().len()
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");

    for size in [64 * 1024, 1024 * 1024, 10 * 1024 * 1024] {
        let data = pseudo_random(size);
        group.throughput(Throughput::Bytes(size as u64));

        for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
            let config = ChunkerConfig::default().with_algorithm(algorithm);
            group.bench_with_input(
                format!("{algorithm:?}_{}kb", size / 1024),
                &data,
                |b, data| b.iter(|| black_box(chunk_count(config, black_box(data), 64 * 1024))),
            );
        }

        // All zeros: every chunk is forced at max_size
        let zeros = vec![0u8; size];
        group.bench_with_input(format!("zeros_{}kb", size / 1024), &zeros, |b, data| {
            b.iter(|| black_box(chunk_count(ChunkerConfig::default(), black_box(data), 64 * 1024)))
        });
    }

    group.finish();
}

fn bench_push_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_sizes");
    let data = pseudo_random(4 * 1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for push_size in [512, 8 * 1024, 256 * 1024] {
        group.bench_function(format!("push_{push_size}"), |b| {
            b.iter(|| black_box(chunk_count(ChunkerConfig::default(), &data, push_size)))
        });
    }

    group.finish();
}

fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool");
    let streams = 8;
    let data = pseudo_random(2 * 1024 * 1024);
    group.throughput(Throughput::Bytes((data.len() * streams) as u64));

    let pool = Arc::new(RayonPool::new(4).unwrap());
    group.bench_function("8_streams_4_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..streams)
                .map(|_| ChunkerHandle::new(ChunkerConfig::default(), Arc::clone(&pool)).unwrap())
                .collect();

            let mut pending = Vec::new();
            for buf in data.chunks(256 * 1024) {
                for handle in &handles {
                    pending.push(handle.push(buf.to_vec()).unwrap());
                }
            }
            for handle in &handles {
                pending.push(handle.flush().unwrap());
            }

            let chunks: usize = pending.into_iter().map(|p| p.wait().unwrap().len()).sum();
            black_box(chunks)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_push_sizes, bench_pool);
criterion_main!(benches);
