//! Water-level synthesis from harmonic constituents
//!
//! The datum engine only needs an evenly spaced series of heights. Where that
//! series comes from is behind [`HarmonicPredictor`], so a full astronomical
//! engine (with nodal corrections and equilibrium arguments) can be plugged in
//! without touching the extrema logic.

use crate::app::models::HarmonicConstituent;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One synthesized water level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterLevelSample {
    pub time: DateTime<Utc>,
    /// Height in meters relative to the constituents' datum
    pub height: f64,
}

impl WaterLevelSample {
    pub fn new(time: DateTime<Utc>, height: f64) -> Self {
        Self { time, height }
    }
}

/// Source of predicted water levels for a set of constituents
pub trait HarmonicPredictor: Send + Sync {
    /// Samples every `step_seconds` over the half-open window `[start, end)`
    fn synthesize(
        &self,
        constituents: &[HarmonicConstituent],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step_seconds: i64,
    ) -> Result<Vec<WaterLevelSample>>;
}

/// Angular speeds in degrees per mean solar hour
const CONSTITUENT_SPEEDS: &[(&str, f64)] = &[
    ("M2", 28.984_104_2),
    ("S2", 30.0),
    ("N2", 28.439_729_5),
    ("K2", 30.082_137_3),
    ("K1", 15.041_068_6),
    ("O1", 13.943_035_6),
    ("P1", 14.958_931_4),
    ("Q1", 13.398_660_9),
    ("2N2", 27.895_354_8),
    ("NU2", 28.512_583_1),
    ("MU2", 27.968_208_4),
    ("L2", 29.528_478_9),
    ("T2", 29.958_933_3),
    ("J1", 15.585_443_3),
    ("OO1", 16.139_101_7),
    ("S1", 15.0),
    ("M3", 43.476_156_3),
    ("M4", 57.968_208_4),
    ("MS4", 58.984_104_2),
    ("MN4", 57.423_833_7),
    ("M6", 86.952_312_7),
    ("MF", 1.098_033_1),
    ("MM", 0.544_374_7),
    ("SSA", 0.082_137_3),
    ("SA", 0.041_068_6),
];

/// Look up the angular speed of a constituent by name (case-insensitive)
pub fn constituent_speed(name: &str) -> Option<f64> {
    let name = name.trim();
    CONSTITUENT_SPEEDS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, speed)| *speed)
}

/// Plain harmonic sum `h(t) = Σ A cos(ω t - G)`
///
/// Time is measured in hours from 1970-01-01T00:00Z and phases are used as
/// given, without nodal factors. Constituents with unknown names are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstituentSumPredictor;

impl ConstituentSumPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl HarmonicPredictor for ConstituentSumPredictor {
    fn synthesize(
        &self,
        constituents: &[HarmonicConstituent],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step_seconds: i64,
    ) -> Result<Vec<WaterLevelSample>> {
        if step_seconds <= 0 {
            return Err(Error::configuration(format!(
                "step_seconds must be positive (got {step_seconds})"
            )));
        }

        // (amplitude, speed in rad/hour, phase in rad)
        let terms: Vec<(f64, f64, f64)> = constituents
            .iter()
            .filter_map(|c| match constituent_speed(&c.name) {
                Some(speed) => Some((c.amplitude, speed.to_radians(), c.phase.to_radians())),
                None => {
                    debug!("Skipping constituent {} with unknown speed", c.name);
                    None
                }
            })
            .collect();

        if terms.is_empty() {
            let names: Vec<&str> = constituents.iter().map(|c| c.name.as_str()).collect();
            return Err(Error::invalid_constituent(
                names.join(", "),
                "no constituent with a known angular speed",
            ));
        }

        let span = (end - start).num_seconds();
        if span <= 0 {
            return Ok(Vec::new());
        }
        let count = (span + step_seconds - 1) / step_seconds;
        let step = Duration::seconds(step_seconds);
        let origin_hours = start.timestamp() as f64 / 3600.0;
        let step_hours = step_seconds as f64 / 3600.0;

        let mut samples = Vec::with_capacity(count as usize);
        let mut time = start;
        for k in 0..count {
            let hours = origin_hours + k as f64 * step_hours;
            let height: f64 = terms
                .iter()
                .map(|(amplitude, speed, phase)| amplitude * (speed * hours - phase).cos())
                .sum();
            samples.push(WaterLevelSample::new(time, height));
            time += step;
        }

        Ok(samples)
    }
}
