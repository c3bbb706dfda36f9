//! Tests for the spatial index service

pub mod query_tests;

use crate::app::models::GeoPoint;

/// Deterministic pseudo-random points spread over the globe
pub fn scattered_points(count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut state = seed;
    let mut next = move || {
        // 64-bit LCG (Knuth MMIX constants)
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..count)
        .map(|_| GeoPoint::new(next() * 180.0 - 90.0, next() * 360.0 - 180.0))
        .collect()
}

/// Points clustered within a few kilometres of a centre
pub fn clustered_points(center: GeoPoint, count: usize, seed: u64) -> Vec<GeoPoint> {
    scattered_points(count, seed)
        .into_iter()
        .map(|p| {
            GeoPoint::new(
                (center.latitude + p.latitude / 90.0 * 0.02).clamp(-90.0, 90.0),
                center.longitude + p.longitude / 180.0 * 0.02,
            )
        })
        .collect()
}
