//! Benchmark: core query pipeline plus end-to-end search latency.
//!
//! Covers the pure pieces (tokenize, predicate build, highlight) and a
//! full store search over an in-memory database at a few sizes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recordkit::{
    build_predicate, highlight, tokenize, CombineMode, ExactFilters, Field, NewRecord,
    RecordStore, SearchRequest,
};

const QUERIES: &[(&str, &str)] = &[
    ("word", "backup"),
    ("phrase", r#""disk image""#),
    ("mixed", r#"backup "disk image" quarterly"#),
    ("no_results", "xyzzyplugh"),
];

const STORE_SIZES: &[usize] = &[1_000, 10_000];

const METADATA_SAMPLES: &[&str] = &[
    "Quarterly disk image backup of the finance share",
    "Incremental backup, verified checksums",
    "Raw disk image captured before decommission",
    "Photo archive export, no verification",
    "Mail server snapshot for litigation hold",
];

fn build_store(rows: usize) -> RecordStore {
    let store = RecordStore::open_in_memory().unwrap();
    let batch: Vec<NewRecord> = (0..rows)
        .map(|i| {
            NewRecord::new(
                format!("R-{i}"),
                format!("D-{}", i % 40),
                format!("{} #{i}", METADATA_SAMPLES[i % METADATA_SAMPLES.len()]),
                format!("reporter-{}", i % 12),
            )
        })
        .collect();
    store.upload(batch).unwrap();
    store
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| tokenize(black_box(query)));
        });
    }
    group.finish();
}

fn bench_build_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_predicate");
    for (name, query) in QUERIES {
        let tokens = tokenize(query);
        group.bench_with_input(BenchmarkId::from_parameter(name), &tokens, |b, tokens| {
            b.iter(|| {
                build_predicate(
                    black_box(tokens),
                    &Field::ALL,
                    &ExactFilters::default(),
                    CombineMode::And,
                )
            });
        });
    }
    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let text = METADATA_SAMPLES.join(" / ");
    let mut group = c.benchmark_group("highlight");
    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| highlight(black_box(&text), black_box(query)));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_search");
    group.sample_size(20);

    for &rows in STORE_SIZES {
        let store = build_store(rows);
        for (name, query) in QUERIES {
            group.throughput(Throughput::Elements(rows as u64));
            group.bench_function(BenchmarkId::new(*name, rows), |b| {
                let request = SearchRequest::with_query(*query);
                b.iter(|| store.search(black_box(&request)).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_build_predicate,
    bench_highlight,
    bench_search
);
criterion_main!(benches);
