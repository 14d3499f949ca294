use dbclust::cluster::{Clustering, Dbscan, Kmeans};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn blobs(rng: &mut StdRng, n: usize, d: usize, centers: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| {
            let offset = (i % centers) as f32 * 10.0;
            (0..d).map(|_| offset + rng.random::<f32>()).collect()
        })
        .collect()
}

fn bench_dbscan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dbscan");

    let mut rng = StdRng::seed_from_u64(42);
    let data = blobs(&mut rng, 1000, 2, 5);

    group.bench_function("fit_n1000_d2", |b| {
        b.iter(|| {
            let model = Dbscan::new(0.3, 5);
            model.fit(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    // Generate synthetic data
    let mut rng = StdRng::seed_from_u64(42);
    let n = 1000;
    let d = 16;
    let k = 10;

    let data: Vec<Vec<f32>> = (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f32>()).collect())
        .collect();

    group.bench_function("fit_predict_n1000_d16_k10", |b| {
        b.iter(|| {
            let model = Kmeans::new(k).with_max_iter(10).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_dbscan, bench_kmeans);
criterion_main!(benches);
