//! Shared fixtures for unit tests

use crate::app::models::{
    CanonicalStation, Epoch, HarmonicConstituent, HeightOffsetType, HeightOffsets,
    StationCandidate, StationSource, StationType, SubordinateOffsets, TimeOffsets,
};
use crate::app::services::station_catalog::StationCatalog;
use chrono::{TimeZone, Utc};

/// A reference station with a single M2 constituent
pub fn reference_candidate(provider: &str, source_id: &str, lat: f64, lon: f64) -> StationCandidate {
    StationCandidate {
        name: format!("Station {source_id}"),
        country: "United States".to_string(),
        region: Some("Maine".to_string()),
        continent: "North America".to_string(),
        latitude: Some(lat),
        longitude: Some(lon),
        timezone: Some("America/New_York".to_string()),
        station_type: StationType::Reference,
        source: StationSource {
            name: provider.to_string(),
            url: format!("https://example.org/{source_id}"),
            id: source_id.to_string(),
        },
        license: "CC-BY-4.0".to_string(),
        disclaimers: None,
        epoch: None,
        harmonic_constituents: vec![HarmonicConstituent::new("M2", 1.2, 45.0)],
        offsets: None,
    }
}

/// A subordinate station pointing at `reference_id`
pub fn subordinate_candidate(
    provider: &str,
    source_id: &str,
    lat: f64,
    lon: f64,
    reference_id: &str,
) -> StationCandidate {
    StationCandidate {
        station_type: StationType::Subordinate,
        harmonic_constituents: Vec::new(),
        offsets: Some(SubordinateOffsets {
            reference: reference_id.to_string(),
            height: HeightOffsets {
                offset_type: HeightOffsetType::Ratio,
                high: 1.1,
                low: 0.9,
            },
            time: TimeOffsets {
                high: 12.0,
                low: -8.0,
            },
        }),
        ..reference_candidate(provider, source_id, lat, lon)
    }
}

/// Epoch from January 1st of `start_year` to January 1st of `end_year`
pub fn epoch_years(start_year: i32, end_year: i32) -> Epoch {
    Epoch {
        start: Utc.with_ymd_and_hms(start_year, 1, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(end_year, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn with_epoch(mut candidate: StationCandidate, start_year: i32, end_year: i32) -> StationCandidate {
    candidate.epoch = Some(epoch_years(start_year, end_year));
    candidate
}

pub fn with_disclaimer(mut candidate: StationCandidate, text: &str) -> StationCandidate {
    candidate.disclaimers = Some(text.to_string());
    candidate
}

/// Promote a candidate without datums
pub fn canonical(candidate: StationCandidate) -> CanonicalStation {
    CanonicalStation::promote(candidate, None, None).unwrap()
}

pub fn catalog_of(candidates: Vec<StationCandidate>) -> StationCatalog {
    StationCatalog::from_stations(candidates.into_iter().map(canonical)).unwrap()
}
