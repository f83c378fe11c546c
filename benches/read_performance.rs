//! Performance benchmarks for hotswap-props.
//!
//! Covers the read path (snapshot acquisition and key lookup), reads racing
//! a writer that keeps swapping mappings, and the cost of a full reload.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hotswap_props::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn sample_mapping(size: usize, generation: usize) -> Mapping {
    (0..size)
        .map(|i| (format!("key.{}", i), format!("value-{}-{}", i, generation)))
        .collect()
}

/// Benchmark single-threaded snapshot reads
fn benchmark_read_latency(c: &mut Criterion) {
    let store = PropertyStore::with_mapping(sample_mapping(100, 0));

    let mut group = c.benchmark_group("read_latency");
    group.bench_function("snapshot", |b| {
        b.iter(|| {
            let props = store.read();
            black_box(props.len());
        });
    });
    group.bench_function("snapshot_and_lookup", |b| {
        b.iter(|| {
            let props = store.read();
            black_box(props.get("key.42"));
        });
    });
    group.bench_function("owned_get", |b| {
        b.iter(|| black_box(store.get("key.42")));
    });
    group.finish();
}

/// Benchmark concurrent reads with varying thread counts
fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [1, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements(num_threads as u64 * 1000));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let store = Arc::new(PropertyStore::with_mapping(sample_mapping(100, 0)));
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let store = Arc::clone(&store);
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                barrier.wait();
                                let start = Instant::now();
                                for _ in 0..iters {
                                    let props = store.read();
                                    black_box(props.get("key.7"));
                                }
                                start.elapsed()
                            })
                        })
                        .collect();

                    barrier.wait();

                    let total: Duration = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    total / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark replacements while readers keep reading
fn benchmark_replace_under_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_under_load");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("replace_with_8_readers", |b| {
        b.iter_custom(|iters| {
            let store = Arc::new(PropertyStore::with_mapping(sample_mapping(100, 0)));
            let keep_running = Arc::new(AtomicBool::new(true));
            let reads_completed = Arc::new(AtomicUsize::new(0));

            let readers: Vec<_> = (0..8)
                .map(|_| {
                    let store = Arc::clone(&store);
                    let running = Arc::clone(&keep_running);
                    let counter = Arc::clone(&reads_completed);
                    thread::spawn(move || {
                        while running.load(Ordering::Relaxed) {
                            let props = store.read();
                            black_box(props.get("key.0"));
                            counter.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                })
                .collect();

            let start = Instant::now();
            for i in 0..iters {
                store.replace(sample_mapping(100, i as usize)).unwrap();
            }
            let duration = start.elapsed();

            keep_running.store(false, Ordering::Relaxed);
            for reader in readers {
                reader.join().unwrap();
            }

            println!(
                "  Completed {} reads during {} replacements",
                reads_completed.load(Ordering::Relaxed),
                iters
            );
            duration
        });
    });

    group.finish();
}

/// Benchmark comparison with lock-based approaches
fn benchmark_lock_comparison(c: &mut Criterion) {
    use std::sync::{Mutex, RwLock};

    let mut group = c.benchmark_group("lock_comparison");

    let store = PropertyStore::with_mapping(sample_mapping(100, 0));
    group.bench_function("arcswap_read", |b| {
        b.iter(|| black_box(store.read().get("key.1").map(str::len)));
    });

    let mutex = Mutex::new(Arc::new(sample_mapping(100, 0)));
    group.bench_function("mutex_arc_read", |b| {
        b.iter(|| black_box(mutex.lock().unwrap().get("key.1").map(str::len)));
    });

    let rwlock = RwLock::new(sample_mapping(100, 0));
    group.bench_function("rwlock_read", |b| {
        b.iter(|| black_box(rwlock.read().unwrap().get("key.1").map(str::len)));
    });

    group.finish();
}

/// Benchmark checking for changes and forcing a full reload
fn benchmark_reload(c: &mut Criterion) {
    let mut entries = MemorySource::new("bench");
    for i in 0..100 {
        entries = entries.with_property(format!("key.{}", i), "value");
    }
    let reloader = Reloader::builder().with_source(entries).build().unwrap();

    let mut group = c.benchmark_group("reload");
    group.bench_function("unchanged_check", |b| {
        b.iter(|| black_box(reloader.reload(false).unwrap()));
    });
    group.bench_function("forced", |b| {
        b.iter(|| black_box(reloader.reload(true).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_read_latency,
    benchmark_concurrent_reads,
    benchmark_replace_under_load,
    benchmark_lock_comparison,
    benchmark_reload,
);

criterion_main!(benches);
