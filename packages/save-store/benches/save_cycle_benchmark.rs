//! Benchmark of the save and load path for slots of varying size.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;

use save_store::{SaveConfig, SaveStore};

/// Creates slot 0 holding `key_count` integer keys.
fn create_populated_store(save_dir: &Path, key_count: usize) -> SaveStore {
    let mut store = SaveStore::new(SaveConfig::with_save_dir(save_dir));
    store.initialize().unwrap();
    store.create_new_slot(0, "bench").unwrap();

    store.begin_transaction().unwrap();
    for i in 0..key_count {
        store.set_int(&format!("key_{}", i), i as i64).unwrap();
    }
    store.commit_transaction().unwrap();
    store
}

fn bench_save_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_slot");
    for key_count in [100, 10_000] {
        let temp_dir = tempdir().unwrap();
        let mut store = create_populated_store(temp_dir.path(), key_count);

        group.bench_with_input(BenchmarkId::from_parameter(key_count), &key_count, |b, _| {
            b.iter(|| store.save_slot(black_box(0)).unwrap())
        });
    }
    group.finish();
}

fn bench_load_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_slot");
    for key_count in [100, 10_000] {
        let temp_dir = tempdir().unwrap();
        let mut store = create_populated_store(temp_dir.path(), key_count);
        store.save_slot(0).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(key_count), &key_count, |b, _| {
            b.iter(|| store.load_slot(black_box(0)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_save_slot, bench_load_slot);
criterion_main!(benches);
