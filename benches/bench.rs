// Criterion benchmarks for Rakt Dispatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rakt_dispatch::core::{distance::haversine_distance, DonorMatcher};
use rakt_dispatch::models::{Coordinate, DonorRecord};

const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

fn create_donor(id: usize, lat: f64, lng: f64) -> DonorRecord {
    DonorRecord {
        user_id: id.to_string(),
        fcm_token: (id % 7 != 0).then(|| format!("token-{}", id)),
        blood_type: Some(BLOOD_TYPES[id % BLOOD_TYPES.len()].to_string()),
        location: Some(format!("{},{}", lat, lng)),
    }
}

fn create_donors(count: usize) -> Vec<DonorRecord> {
    (0..count)
        .map(|i| {
            // Spread donors over roughly 2 degrees around Bengaluru
            let lat = 12.9716 + ((i % 200) as f64 - 100.0) * 0.01;
            let lng = 77.5946 + ((i / 200 % 200) as f64 - 100.0) * 0.01;
            create_donor(i, lat, lng)
        })
        .collect()
}

fn bench_haversine(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(12.9716),
                black_box(77.5946),
                black_box(13.0827),
                black_box(80.2707),
            )
        })
    });
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("donor_matching");
    let matcher = DonorMatcher::default();
    let origin = Coordinate::new(12.9716, 77.5946);

    for size in [100usize, 1_000, 10_000] {
        let donors = create_donors(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &donors, |b, donors| {
            b.iter(|| matcher.filter(black_box(&origin), "AB+", donors.clone()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_haversine, bench_matching);
criterion_main!(benches);
