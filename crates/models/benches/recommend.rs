//! Benchmarks for fitting and recommending
//!
//! Run with: cargo bench --package models
//!
//! Uses a synthetic 200x120 purchase matrix with roughly a third of the cells observed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::RatingMatrix;
use models::{ItemNeighborhoodModel, LatentFactorModel, Recommender, UserNeighborhoodModel};

const USERS: usize = 200;
const ITEMS: usize = 120;

fn synthetic_matrix() -> RatingMatrix {
    let users = (0..USERS).map(|u| format!("c{u:04}")).collect();
    let items = (0..ITEMS).map(|i| format!("p{i:04}")).collect();
    let rows = (0..USERS)
        .map(|u| {
            (0..ITEMS)
                .map(|i| {
                    if (u * 13 + i * 7) % 3 == 0 {
                        Some(((u * 31 + i * 17) % 9 + 1) as f64)
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect();
    RatingMatrix::from_rows(users, items, rows).expect("Failed to build synthetic matrix")
}

fn bench_latent_fit(c: &mut Criterion) {
    let matrix = synthetic_matrix();

    c.bench_function("latent_factor_fit", |b| {
        b.iter(|| {
            let mut model = LatentFactorModel::new(10);
            model.fit(black_box(&matrix)).unwrap();
            black_box(model)
        })
    });
}

fn bench_item_recommend(c: &mut Criterion) {
    let matrix = synthetic_matrix();
    let mut model = ItemNeighborhoodModel::new(10);
    model.fit(&matrix).expect("Failed to fit item model");

    c.bench_function("item_neighborhood_recommend", |b| {
        b.iter(|| black_box(model.recommend(black_box("c0001"), black_box(10))))
    });
}

fn bench_user_recommend(c: &mut Criterion) {
    let matrix = synthetic_matrix();
    let mut model = UserNeighborhoodModel::new(10);
    model.fit(&matrix).expect("Failed to fit user model");

    c.bench_function("user_neighborhood_recommend", |b| {
        b.iter(|| black_box(model.recommend(black_box("c0001"), black_box(10))))
    });
}

criterion_group!(
    benches,
    bench_latent_fit,
    bench_item_recommend,
    bench_user_recommend
);
criterion_main!(benches);
