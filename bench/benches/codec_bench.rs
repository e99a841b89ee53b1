//! Criterion benchmark harness: per-vector cost of the two codecs and of one
//! committed SQLite insert/select at common embedding sizes.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use emb_core::{BinaryCodec, JsonCodec, VectorCodec, generate_embeddings};
use embedding_bench::backend::EmbeddingBackend;
use embedding_bench::backend::sqlite::SqliteBackend;
use std::hint::black_box;

/// Embedding widths to benchmark.
const DIMENSIONS: [usize; 3] = [384, 768, 1536];

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    for dim in DIMENSIONS {
        let vector = generate_embeddings(1, dim, 1).remove(0).vector;

        group.bench_with_input(BenchmarkId::new("json/encode", dim), &vector, |b, v| {
            b.iter(|| JsonCodec.encode(black_box(v)).expect("encode"));
        });
        let json = JsonCodec.encode(&vector).expect("encode");
        group.bench_with_input(BenchmarkId::new("json/decode", dim), &json, |b, v| {
            b.iter(|| JsonCodec.decode(black_box(v)).expect("decode"));
        });

        group.bench_with_input(BenchmarkId::new("bincode/encode", dim), &vector, |b, v| {
            b.iter(|| BinaryCodec.encode(black_box(v)).expect("encode"));
        });
        let bytes = BinaryCodec.encode(&vector).expect("encode");
        group.bench_with_input(BenchmarkId::new("bincode/decode", dim), &bytes, |b, v| {
            b.iter(|| BinaryCodec.decode(black_box(v)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_sqlite_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite");
    group.sample_size(50);

    for dim in DIMENSIONS {
        let mut backend = SqliteBackend::open_in_memory().expect("open in-memory SQLite");
        backend.reset_table().expect("create table");
        let records = generate_embeddings(10_000, dim, 2);
        let mut next = 0usize;

        group.bench_function(BenchmarkId::new("insert", dim), |b| {
            b.iter(|| {
                if next == records.len() {
                    backend.reset_table().expect("reset table");
                    next = 0;
                }
                backend.insert(&records[next]).expect("insert");
                next += 1;
            });
        });

        group.bench_function(BenchmarkId::new("fetch", dim), |b| {
            let mut key = 0usize;
            b.iter(|| {
                let found = backend.fetch(&records[key % next.max(1)].key).expect("fetch");
                key += 1;
                black_box(found)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_codecs, bench_sqlite_roundtrip);
criterion_main!(benches);
