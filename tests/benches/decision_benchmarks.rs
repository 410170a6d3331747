//! # Scan Gate Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Allow-list lookup | O(1), < 1µs |
//! | Decision (in-memory store) | < 50µs |
//! | History page of 20 | < 5ms at 10k records |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

use scan_gate::{
    AllowList, Identifier, InMemoryScanStore, RecordOutcome, ScanDecisionApi,
    ScanDecisionEngine, ScanGateConfig, ScanStore,
};

fn allow_list_of(size: usize) -> AllowList {
    (0..size).map(|i| format!("UID-{:06}", i)).collect()
}

// ============================================================================
// Allow-list membership
// ============================================================================

fn bench_allow_list_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("allow-list");

    for size in [100, 10_000, 100_000] {
        let list = allow_list_of(size);
        let hit = Identifier::parse(format!("UID-{:06}", size / 2)).unwrap();
        let miss = Identifier::parse("UID-unknown").unwrap();

        group.bench_with_input(BenchmarkId::new("contains_hit", size), &size, |b, _| {
            b.iter(|| black_box(list.contains(&hit)))
        });
        group.bench_with_input(BenchmarkId::new("contains_miss", size), &size, |b, _| {
            b.iter(|| black_box(list.contains(&miss)))
        });
    }

    group.finish();
}

// ============================================================================
// Decisions
// ============================================================================

fn bench_decisions(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("decision");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    let config = ScanGateConfig::default();
    let allow_list = Arc::new(allow_list_of(10_000));

    // After the first iteration every call is a recorded duplicate.
    let store = Arc::new(InMemoryScanStore::new());
    let engine = ScanDecisionEngine::new(allow_list.clone(), store, &config);
    group.bench_function("duplicate", |b| {
        b.iter(|| runtime.block_on(engine.decide(black_box("UID-000042"))))
    });

    let store = Arc::new(InMemoryScanStore::new());
    let engine = ScanDecisionEngine::new(allow_list, store, &config);
    group.bench_function("invalid", |b| {
        b.iter(|| runtime.block_on(engine.decide(black_box("NOT-ON-LIST"))))
    });

    group.finish();
}

// ============================================================================
// History
// ============================================================================

fn bench_history(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("history");

    for records in [1_000, 10_000] {
        let store = InMemoryScanStore::new();
        runtime.block_on(async {
            for i in 0..records {
                let identifier = Identifier::parse(format!("UID-{:06}", i)).unwrap();
                store
                    .commit(&identifier, RecordOutcome::DeniedInvalid)
                    .await
                    .unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::new("recent_20", records), &records, |b, _| {
            b.iter(|| runtime.block_on(store.recent(black_box(20))).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_allow_list_lookup,
    bench_decisions,
    bench_history,
);

criterion_main!(benches);
