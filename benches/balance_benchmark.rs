//! Benchmark of synthetic minority oversampling
//!
//! Run with: cargo bench --bench balance_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::SeedableRng;

use phishprep::pipeline::{oversample, BalancerConfig, FeatureMatrix};

/// Imbalanced matrix with roughly one positive row in `ratio`
fn generate_imbalanced(n_rows: usize, n_features: usize, ratio: usize, seed: u64) -> (FeatureMatrix, Vec<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let rows: Vec<Vec<f64>> = (0..n_rows)
        .map(|_| (0..n_features).map(|_| rng.gen::<f64>() * 100.0).collect())
        .collect();
    let target: Vec<i64> = (0..n_rows).map(|i| i64::from(i % ratio == 0)).collect();

    let features = FeatureMatrix {
        columns: (0..n_features).map(|i| format!("feature_{}", i)).collect(),
        rows,
    };
    (features, target)
}

fn bench_oversample(c: &mut Criterion) {
    let mut group = c.benchmark_group("oversample");
    group.sample_size(10);
    let config = BalancerConfig::default();

    for n_rows in [500usize, 2_000, 5_000] {
        let (features, target) = generate_imbalanced(n_rows, 40, 5, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n_rows),
            &(features, target),
            |b, (features, target)| {
                b.iter(|| {
                    oversample(black_box(features.clone()), black_box(target.clone()), &config)
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oversample);
criterion_main!(benches);
