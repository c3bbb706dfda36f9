//! Tests for proximity queries

use super::*;
use crate::Error;
use crate::app::services::spatial_index::{NearQuery, SpatialIndex, haversine_km};

#[test]
fn test_empty_index_returns_nothing() {
    let index = SpatialIndex::build(&[]).unwrap();
    assert!(index.is_empty());
    assert!(
        index
            .near(GeoPoint::new(0.0, 0.0), NearQuery::default())
            .unwrap()
            .is_empty()
    );
    assert!(index.nearest(GeoPoint::new(0.0, 0.0), 10.0).unwrap().is_none());
}

#[test]
fn test_build_rejects_invalid_points() {
    let result = SpatialIndex::build(&[GeoPoint::new(0.0, 0.0), GeoPoint::new(91.0, 0.0)]);
    assert!(matches!(result, Err(Error::InvalidGeolocation { .. })));
}

#[test]
fn test_query_rejects_invalid_point() {
    let index = SpatialIndex::build(&[GeoPoint::new(0.0, 0.0)]).unwrap();
    assert!(
        index
            .near(GeoPoint::new(0.0, 200.0), NearQuery::default())
            .is_err()
    );
}

#[test]
fn test_results_sorted_and_within_radius() {
    let center = GeoPoint::new(44.0, -67.0);
    let points = clustered_points(center, 500, 7);
    let index = SpatialIndex::build(&points).unwrap();

    for radius in [0.05, 0.5, 1.0, 2.5] {
        let hits = index
            .near(center, NearQuery::within(radius).with_max_results(1000))
            .unwrap();

        assert!(hits.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(hits.iter().all(|h| h.distance_km <= radius));

        // Every point inside the radius was found
        let expected = points
            .iter()
            .filter(|p| haversine_km(center, **p) <= radius)
            .count();
        assert_eq!(hits.len(), expected, "radius {radius}");
    }
}

#[test]
fn test_unbounded_query_matches_brute_force() {
    let points = scattered_points(400, 42);
    let index = SpatialIndex::build(&points).unwrap();

    for query_point in scattered_points(20, 99) {
        let hits = index
            .near(query_point, NearQuery::default().with_max_results(15))
            .unwrap();

        let mut brute: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (haversine_km(query_point, *p), i))
            .collect();
        brute.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let expected: Vec<usize> = brute.iter().take(15).map(|(_, i)| *i).collect();
        let found: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(found, expected);
    }
}

#[test]
fn test_default_query_returns_ten() {
    let points = scattered_points(50, 3);
    let index = SpatialIndex::build(&points).unwrap();
    let hits = index
        .near(GeoPoint::new(0.0, 0.0), NearQuery::default())
        .unwrap();
    assert_eq!(hits.len(), 10);
}

#[test]
fn test_nearest_equals_near_with_one_result() {
    let points = scattered_points(300, 11);
    let index = SpatialIndex::build(&points).unwrap();

    for query_point in scattered_points(25, 12) {
        for radius in [f64::INFINITY, 500.0, 50.0] {
            let near = index
                .near(query_point, NearQuery::within(radius).with_max_results(1))
                .unwrap();
            let nearest = index.nearest(query_point, radius).unwrap();
            assert_eq!(near.first().copied(), nearest);
        }
    }
}

#[test]
fn test_ties_broken_by_insertion_order() {
    let query_point = GeoPoint::new(10.0, 10.0);
    let points = vec![
        GeoPoint::new(10.0, 10.01),
        GeoPoint::new(10.0, 9.98),
        GeoPoint::new(10.0, 10.01),
        GeoPoint::new(10.0, 10.5),
    ];
    let index = SpatialIndex::build(&points).unwrap();

    let hits = index
        .near(query_point, NearQuery::default().with_max_results(2))
        .unwrap();
    let found: Vec<usize> = hits.iter().map(|h| h.index).collect();
    assert_eq!(found, vec![0, 2]);

    let bounded = index
        .near(query_point, NearQuery::within(5.0).with_max_results(3))
        .unwrap();
    assert_eq!(bounded.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0, 2, 1]);
}

#[test]
fn test_predicate_filters_by_index() {
    let points = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 0.0001),
        GeoPoint::new(0.0, 0.0002),
    ];
    let index = SpatialIndex::build(&points).unwrap();

    let hit = index
        .nearest_filtered(GeoPoint::new(0.0, 0.0), 1.0, |i| i != 0)
        .unwrap()
        .unwrap();
    assert_eq!(hit.index, 1);

    let none = index
        .nearest_filtered(GeoPoint::new(0.0, 0.0), 1.0, |_| false)
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_zero_results_and_negative_radius() {
    let index = SpatialIndex::build(&[GeoPoint::new(0.0, 0.0)]).unwrap();
    let origin = GeoPoint::new(0.0, 0.0);
    assert!(
        index
            .near(origin, NearQuery::default().with_max_results(0))
            .unwrap()
            .is_empty()
    );
    assert!(index.near(origin, NearQuery::within(-1.0)).unwrap().is_empty());
    assert_eq!(index.near(origin, NearQuery::within(0.0)).unwrap().len(), 1);
}

#[test]
fn test_antimeridian_neighbours_found() {
    let points = vec![
        GeoPoint::new(-17.0, 179.9996),
        GeoPoint::new(-17.0, 170.0),
        GeoPoint::new(-17.0, -179.9996),
    ];
    let index = SpatialIndex::build(&points).unwrap();

    let hits = index
        .near(GeoPoint::new(-17.0, -179.9999), NearQuery::within(0.1))
        .unwrap();
    let mut found: Vec<usize> = hits.iter().map(|h| h.index).collect();
    found.sort();
    assert_eq!(found, vec![0, 2]);
}

#[test]
fn test_polar_neighbours_found() {
    let points = vec![
        GeoPoint::new(89.9999, -120.0),
        GeoPoint::new(89.9999, 60.0),
        GeoPoint::new(85.0, 0.0),
    ];
    let index = SpatialIndex::build(&points).unwrap();

    let hits = index
        .near(GeoPoint::new(90.0, 0.0), NearQuery::within(0.05))
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.index < 2));
}

#[test]
fn test_index_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SpatialIndex>();
}
