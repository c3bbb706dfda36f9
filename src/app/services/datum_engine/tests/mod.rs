//! Tests for the synthetic datum engine

pub mod epoch_tests;

use super::{HarmonicPredictor, WaterLevelSample};
use crate::Result;
use crate::app::models::HarmonicConstituent;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn m2_s2() -> Vec<HarmonicConstituent> {
    vec![
        HarmonicConstituent::new("M2", 1.2, 45.0),
        HarmonicConstituent::new("S2", 0.3, 80.0),
    ]
}

/// Replays fixed heights at the requested step, ignoring the constituents
pub struct FixedSeriesPredictor {
    pub heights: Vec<f64>,
}

impl HarmonicPredictor for FixedSeriesPredictor {
    fn synthesize(
        &self,
        _constituents: &[HarmonicConstituent],
        start: DateTime<Utc>,
        _end: DateTime<Utc>,
        step_seconds: i64,
    ) -> Result<Vec<WaterLevelSample>> {
        Ok(self
            .heights
            .iter()
            .enumerate()
            .map(|(k, &height)| {
                WaterLevelSample::new(start + Duration::seconds(k as i64 * step_seconds), height)
            })
            .collect())
    }
}

/// Returns a prepared series verbatim
pub struct RawSeriesPredictor {
    pub samples: Vec<WaterLevelSample>,
}

impl HarmonicPredictor for RawSeriesPredictor {
    fn synthesize(
        &self,
        _constituents: &[HarmonicConstituent],
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _step_seconds: i64,
    ) -> Result<Vec<WaterLevelSample>> {
        Ok(self.samples.clone())
    }
}
