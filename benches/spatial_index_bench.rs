//! Benchmarks for the great-circle spatial index
//!
//! Station sets are generated with a fixed linear congruential sequence so
//! runs are comparable.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tide_catalog::GeoPoint;
use tide_catalog::app::services::spatial_index::{NearQuery, SpatialIndex};

fn station_points(count: usize) -> Vec<GeoPoint> {
    let mut state: u64 = 0x5eed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..count)
        .map(|_| GeoPoint::new(next() * 180.0 - 90.0, next() * 360.0 - 180.0))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_index_build");
    for count in [1_000, 10_000, 50_000] {
        let points = station_points(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| SpatialIndex::build(black_box(points)).unwrap())
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let points = station_points(50_000);
    let index = SpatialIndex::build(&points).unwrap();
    let probes = station_points(256);

    c.bench_function("nearest_within_100m", |b| {
        b.iter(|| {
            for probe in &probes {
                black_box(index.nearest(*probe, 0.1).unwrap());
            }
        })
    });

    c.bench_function("near_within_200km", |b| {
        let query = NearQuery::within(200.0).with_max_results(25);
        b.iter(|| {
            for probe in &probes {
                black_box(index.near(*probe, query).unwrap());
            }
        })
    });

    c.bench_function("near_unbounded_top10", |b| {
        b.iter(|| {
            for probe in &probes {
                black_box(index.near(*probe, NearQuery::default()).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
