//! Tests for the station catalog service

use crate::Error;
use crate::app::models::GeoPoint;
use crate::app::services::spatial_index::NearQuery;
use crate::app::services::station_catalog::StationCatalog;
use crate::test_support::{
    canonical, catalog_of, reference_candidate, subordinate_candidate,
};

#[test]
fn test_insert_get_remove() {
    let mut catalog = StationCatalog::new();
    assert!(catalog.is_empty());

    let station = canonical(reference_candidate("NOAA", "8443970", 42.35, -71.05));
    assert!(catalog.insert(station.clone()).unwrap().is_none());
    assert!(catalog.contains("noaa/8443970"));
    assert_eq!(catalog.get("noaa/8443970"), Some(&station));

    // Re-inserting replaces and returns the previous record
    assert!(catalog.insert(station).unwrap().is_some());
    assert_eq!(catalog.len(), 1);

    assert!(catalog.remove("noaa/8443970").is_some());
    assert!(catalog.is_empty());
}

#[test]
fn test_insert_rejects_mismatched_id_and_bad_location() {
    let mut catalog = StationCatalog::new();

    let mut station = canonical(reference_candidate("NOAA", "1", 0.0, 0.0));
    station.id = "noaa/2".to_string();
    assert!(matches!(
        catalog.insert(station),
        Err(Error::DataValidation { .. })
    ));

    let mut station = canonical(reference_candidate("NOAA", "1", 0.0, 0.0));
    station.station.longitude = None;
    assert!(matches!(
        catalog.insert(station),
        Err(Error::InvalidGeolocation { .. })
    ));
}

#[test]
fn test_from_stations_rejects_duplicates() {
    let station = canonical(reference_candidate("NOAA", "1", 0.0, 0.0));
    let result = StationCatalog::from_stations(vec![station.clone(), station]);
    assert!(result.is_err());
}

#[test]
fn test_provider_queries_are_case_insensitive() {
    let catalog = catalog_of(vec![
        reference_candidate("NOAA", "1", 10.0, 10.0),
        reference_candidate("noaa", "2", 11.0, 10.0),
        reference_candidate("TICON", "x-bodc", 12.0, 10.0),
    ]);

    assert!(catalog.has_provider("Noaa"));
    assert!(!catalog.has_provider("UHSLC"));
    assert_eq!(catalog.stations_by_provider("NOAA").len(), 2);
}

#[test]
fn test_catalog_index_filters_by_station() {
    let catalog = catalog_of(vec![
        reference_candidate("NOAA", "1", 44.0, -67.0),
        reference_candidate("TICON", "a-bodc", 44.0001, -67.0),
        reference_candidate("NOAA", "2", 45.0, -67.0),
    ]);
    let index = catalog.spatial_index().unwrap();
    assert_eq!(index.len(), 3);

    let origin = GeoPoint::new(44.0, -67.0);
    let all = index.near(origin, NearQuery::within(1.0)).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].0.id, "noaa/1");

    let ticon = index
        .near_matching(origin, NearQuery::within(1.0), |s| s.provider() == "TICON")
        .unwrap();
    assert_eq!(ticon.len(), 1);
    assert_eq!(ticon[0].0.id, "ticon/a-bodc");
}

#[test]
fn test_validate_references() {
    let mut catalog = catalog_of(vec![
        reference_candidate("NOAA", "1", 44.0, -67.0),
        subordinate_candidate("NOAA", "2", 44.1, -67.0, "noaa/1"),
    ]);
    assert!(catalog.validate_references().is_ok());
    assert_eq!(catalog.subordinates_of("noaa/1").len(), 1);

    catalog.remove("noaa/1");
    assert!(matches!(
        catalog.validate_references(),
        Err(Error::UnresolvedReference { ref reference_id, .. }) if reference_id == "noaa/1"
    ));
}

#[test]
fn test_subordinate_cannot_reference_subordinate() {
    let catalog = catalog_of(vec![
        reference_candidate("NOAA", "1", 44.0, -67.0),
        subordinate_candidate("NOAA", "2", 44.1, -67.0, "noaa/1"),
        subordinate_candidate("NOAA", "3", 44.2, -67.0, "noaa/2"),
    ]);
    assert!(catalog.validate_references().is_err());
}
