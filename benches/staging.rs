// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for the staging store and result correlation.
//!
//! Measures the performance of:
//! - Staging a batch and partitioning it for display
//! - Removing entries one by one
//! - Pairing server output names with submitted names

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use iced_detect::application::staging::StagingStore;
use iced_detect::domain::media::SourcePayload;
use iced_detect::domain::results::correlate;
use iced_detect::test_utils::CountingAllocator;
use std::hint::black_box;

const BATCH: usize = 200;

fn batch() -> Vec<SourcePayload> {
    (0..BATCH)
        .map(|i| {
            let name = if i % 4 == 0 {
                format!("report_{i}.pdf")
            } else {
                format!("photo_{i}.jpg")
            };
            SourcePayload::new(name, vec![0u8; 1024])
        })
        .collect()
}

/// Staging a batch, then grouping it the way the upload screen does.
fn bench_stage_and_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("staging");

    group.bench_function("add_and_partition", |b| {
        b.iter_batched(
            batch,
            |sources| {
                let mut store = StagingStore::new(CountingAllocator::new());
                store.add(sources);
                let partition = store.partition();
                black_box((partition.images.len(), partition.documents.len()));
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_remove_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("staging");

    group.bench_function("remove_each", |b| {
        b.iter_batched(
            || {
                let mut store = StagingStore::new(CountingAllocator::new());
                let ids = store.add(batch());
                (store, ids)
            },
            |(mut store, ids)| {
                for id in ids.into_iter().rev() {
                    let _ = black_box(store.remove(id));
                }
                black_box(store.is_empty());
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Output names arrive shuffled and prefixed.
fn bench_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("results");

    let submitted: Vec<String> = (0..BATCH).map(|i| format!("photo_{i}.jpg")).collect();
    let outputs: Vec<String> = submitted
        .iter()
        .rev()
        .map(|name| format!("annotated_{name}"))
        .collect();

    group.bench_function("correlate", |b| {
        b.iter(|| black_box(correlate(black_box(&submitted), black_box(&outputs))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_stage_and_partition,
    bench_remove_all,
    bench_correlate
);
criterion_main!(benches);
