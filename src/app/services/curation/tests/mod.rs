//! Tests for the curation pipeline


use super::{CurationPipeline, PlaceInfo, PlaceLookup};
use crate::Result;
use crate::app::models::{HarmonicConstituent, StationCandidate};
use crate::app::services::datum_engine::{
    ConstituentSumPredictor, HarmonicPredictor, WaterLevelSample,
};
use crate::config::CatalogConfig;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// One-year windows keep synthesized series small
pub fn test_config() -> CatalogConfig {
    let mut config = CatalogConfig::default().with_workers(2);
    config.datums.epoch_years = 1;
    config
}

/// Counts synthesize calls while delegating to the constituent sum
#[derive(Default)]
pub struct CountingPredictor {
    pub calls: AtomicUsize,
    inner: ConstituentSumPredictor,
}

impl CountingPredictor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HarmonicPredictor for CountingPredictor {
    fn synthesize(
        &self,
        constituents: &[HarmonicConstituent],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step_seconds: i64,
    ) -> Result<Vec<WaterLevelSample>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.synthesize(constituents, start, end, step_seconds)
    }
}

pub fn pipeline(predictor: Arc<CountingPredictor>) -> CurationPipeline {
    CurationPipeline::new(test_config(), predictor).with_now(fixed_now())
}

/// Answers every query with the same place
pub struct FixedPlace(pub Option<PlaceInfo>);

impl PlaceLookup for FixedPlace {
    fn nearest_place(&self, _lat: f64, _lon: f64, _max_distance_km: f64) -> Option<PlaceInfo> {
        self.0.clone()
    }
}

pub fn without_place(mut candidate: StationCandidate) -> StationCandidate {
    candidate.country = String::new();
    candidate.continent = String::new();
    candidate.region = None;
    candidate
}
