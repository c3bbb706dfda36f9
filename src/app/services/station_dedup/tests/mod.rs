//! Tests for the station deduplication module

pub mod phase_tests;

use crate::app::models::StationCandidate;
use crate::app::services::station_dedup::{DedupOutcome, deduplicate};
use crate::app::services::station_catalog::StationCatalog;
use crate::config::DedupConfig;

/// Metres expressed as degrees of latitude
pub fn metres_north(metres: f64) -> f64 {
    metres / 111_195.0
}

/// Run the pipeline with default configuration
pub fn run_default(catalog: &StationCatalog, batch: &[StationCandidate]) -> DedupOutcome {
    deduplicate(catalog, batch, &DedupConfig::default()).unwrap()
}

pub fn surviving_ids(outcome: &DedupOutcome) -> Vec<String> {
    outcome.surviving_ids()
}
