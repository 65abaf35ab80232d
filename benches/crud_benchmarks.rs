use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use leafline::{BPlusTreeMap, Order};
use std::collections::BTreeMap;

const N: usize = 10_000;

const ORDERS: [usize; 3] = [3, 8, 32];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn sequences() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

fn build(order: usize, keys: &[i64]) -> BPlusTreeMap<i64, i64> {
    let mut map = BPlusTreeMap::with_order(Order::new(order).unwrap());
    for &k in keys {
        map.insert(k, k);
    }
    map
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (name, keys) in sequences() {
        let mut group = c.benchmark_group(format!("map_insert_{name}"));

        for order in ORDERS {
            group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
                b.iter(|| build(order, &keys));
            });
        }

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| keys.iter().map(|&k| (k, k)).collect::<BTreeMap<_, _>>());
        });

        group.finish();
    }
}

fn bench_get(c: &mut Criterion) {
    for (name, keys) in sequences() {
        let mut group = c.benchmark_group(format!("map_get_{name}"));

        for order in ORDERS {
            let map = build(order, &keys);
            group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
                b.iter(|| {
                    for k in &keys {
                        black_box(map.get(k));
                    }
                });
            });
        }

        let bt: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(bt.get(k));
                }
            });
        });

        group.finish();
    }
}

fn bench_remove(c: &mut Criterion) {
    for (name, keys) in sequences() {
        let mut group = c.benchmark_group(format!("map_remove_{name}"));

        for order in ORDERS {
            group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
                b.iter_batched(
                    || build(order, &keys),
                    |mut map| {
                        for k in &keys {
                            map.remove(k);
                        }
                        map
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<_, _>>(),
                |mut map| {
                    for k in &keys {
                        map.remove(k);
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

fn bench_scan(c: &mut Criterion) {
    let keys = random_keys(N);
    let (low, high) = (1 << 28, 3 << 28);
    let mut group = c.benchmark_group("map_scan");

    for order in ORDERS {
        let map = build(order, &keys);
        group.bench_function(BenchmarkId::new("BPlusTreeMap/iter", order), |b| {
            b.iter(|| map.iter().map(|(_, v)| *v).sum::<i64>());
        });
        group.bench_function(BenchmarkId::new("BPlusTreeMap/range", order), |b| {
            b.iter(|| map.range(&low, &high).count());
        });
    }

    let bt: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap/iter", N), |b| {
        b.iter(|| bt.values().sum::<i64>());
    });
    group.bench_function(BenchmarkId::new("BTreeMap/range", N), |b| {
        b.iter(|| bt.range(low + 1..high).count());
    });

    group.finish();
}

criterion_group!(map_benches, bench_insert, bench_get, bench_remove, bench_scan,);

criterion_main!(map_benches);
