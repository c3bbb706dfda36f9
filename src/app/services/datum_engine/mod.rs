//! Synthetic tidal datums from harmonic constituents
//!
//! Many providers publish constituents without the datums needed to reference
//! predictions to chart datum. This module synthesizes a water-level series
//! over an analysis window (19 years by default, one nodal cycle), finds high
//! and low waters per tidal day, and aggregates them:
//!
//! - MHHW / MLLW: mean of each tidal day's higher high / lower low
//! - MHW / MLW: mean of all highs / lows
//! - MSL: mean of every sample
//! - MTL: midpoint of MHW and MLW
//! - LAT: lowest sample in the window

use crate::app::models::{Epoch, HarmonicConstituent, TidalDatums};
use crate::config::DatumConfig;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

pub mod datums;
pub mod epoch;
pub mod extrema;
pub mod predictor;

#[cfg(test)]
pub mod tests;

pub use datums::round_datum;
pub use epoch::resolve_window;
pub use extrema::{TidalDayExtrema, find_extrema, tidal_days};
pub use predictor::{
    ConstituentSumPredictor, HarmonicPredictor, WaterLevelSample, constituent_speed,
};

use datums::DatumAccumulator;

/// Parameters for one datum computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumOptions {
    pub step_seconds: i64,
    pub tidal_day_hours: f64,
    pub epoch_years: u32,
    /// Reference instant for the default window; current time when unset
    pub now: Option<DateTime<Utc>>,
}

impl Default for DatumOptions {
    fn default() -> Self {
        Self::from(&DatumConfig::default())
    }
}

impl From<&DatumConfig> for DatumOptions {
    fn from(config: &DatumConfig) -> Self {
        Self {
            step_seconds: config.step_seconds,
            tidal_day_hours: config.tidal_day_hours,
            epoch_years: config.epoch_years,
            now: None,
        }
    }
}

impl DatumOptions {
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.step_seconds <= 0 {
            return Err(Error::configuration(format!(
                "step_seconds must be positive (got {})",
                self.step_seconds
            )));
        }
        if !self.tidal_day_hours.is_finite() || self.tidal_day_hours <= 0.0 {
            return Err(Error::configuration(format!(
                "tidal_day_hours must be positive (got {})",
                self.tidal_day_hours
            )));
        }
        if self.epoch_years == 0 {
            return Err(Error::configuration("epoch_years must be at least 1"));
        }
        Ok(())
    }
}

/// Datums together with the window and parameters that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumsResult {
    pub datums: TidalDatums,
    pub resolved_start: DateTime<Utc>,
    pub resolved_end: DateTime<Utc>,
    pub length_years: f64,
    pub step_seconds: i64,
    pub tidal_day_hours: f64,
}

impl DatumsResult {
    /// The analysis window as an epoch
    pub fn epoch(&self) -> Epoch {
        Epoch {
            start: self.resolved_start,
            end: self.resolved_end,
        }
    }
}

/// Derive tidal datums for one station
pub fn compute_datums<P>(
    predictor: &P,
    constituents: &[HarmonicConstituent],
    epoch: Option<&Epoch>,
    options: &DatumOptions,
) -> Result<DatumsResult>
where
    P: HarmonicPredictor + ?Sized,
{
    options.validate()?;
    validate_constituents(constituents)?;

    let now = options.now.unwrap_or_else(Utc::now);
    let window = resolve_window(epoch, options.epoch_years, now)?;

    let started = Instant::now();
    let samples = predictor.synthesize(constituents, window.start, window.end, options.step_seconds)?;
    validate_series(&samples)?;

    let mut accumulator = DatumAccumulator::default();
    for sample in &samples {
        accumulator.add_sample(sample.height);
    }

    let window_seconds = options.tidal_day_hours * 3600.0;
    for day in tidal_days(&samples, window_seconds) {
        let heights: Vec<f64> = day.iter().map(|s| s.height).collect();
        accumulator.add_day(&find_extrema(&heights));
    }

    let datums = accumulator.finish()?;

    debug!(
        "Computed datums from {} samples ({} highs, {} lows) in {:.2}s",
        samples.len(),
        accumulator.high_count(),
        accumulator.low_count(),
        started.elapsed().as_secs_f64()
    );

    Ok(DatumsResult {
        datums,
        resolved_start: window.start,
        resolved_end: window.end,
        length_years: window.length_years(),
        step_seconds: options.step_seconds,
        tidal_day_hours: options.tidal_day_hours,
    })
}

fn validate_constituents(constituents: &[HarmonicConstituent]) -> Result<()> {
    if constituents.is_empty() {
        return Err(Error::empty_constituents(
            "datums require at least one harmonic constituent",
        ));
    }
    constituents.iter().try_for_each(HarmonicConstituent::validate)
}

/// The series must be non-empty, finite and strictly increasing in time
fn validate_series(samples: &[WaterLevelSample]) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::series_mismatch("predictor returned no samples"));
    }

    if let Some(bad) = samples.iter().find(|s| !s.height.is_finite()) {
        return Err(Error::series_mismatch(format!(
            "non-finite height {} at {}",
            bad.height, bad.time
        )));
    }

    if let Some(pair) = samples.windows(2).find(|pair| pair[1].time <= pair[0].time) {
        return Err(Error::series_mismatch(format!(
            "timestamps not increasing: {} followed by {}",
            pair[0].time, pair[1].time
        )));
    }

    Ok(())
}
