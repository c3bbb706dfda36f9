//! Aggregation of extrema into tidal datums

use crate::app::models::TidalDatums;
use crate::constants::DATUM_DECIMALS;
use crate::{Error, Result};

use super::extrema::TidalDayExtrema;

/// Running sums across the whole series
#[derive(Debug, Clone)]
pub(crate) struct DatumAccumulator {
    sample_sum: f64,
    sample_count: usize,
    minimum: f64,
    highs: Mean,
    lows: Mean,
    higher_highs: Mean,
    lower_lows: Mean,
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

impl Default for DatumAccumulator {
    fn default() -> Self {
        Self {
            sample_sum: 0.0,
            sample_count: 0,
            minimum: f64::INFINITY,
            highs: Mean::default(),
            lows: Mean::default(),
            higher_highs: Mean::default(),
            lower_lows: Mean::default(),
        }
    }
}

impl DatumAccumulator {
    pub fn add_sample(&mut self, height: f64) {
        self.sample_sum += height;
        self.sample_count += 1;
        self.minimum = self.minimum.min(height);
    }

    pub fn add_day(&mut self, day: &TidalDayExtrema) {
        for &high in &day.highs {
            self.highs.add(high);
        }
        for &low in &day.lows {
            self.lows.add(low);
        }
        if let Some(higher_high) = day.higher_high() {
            self.higher_highs.add(higher_high);
        }
        if let Some(lower_low) = day.lower_low() {
            self.lower_lows.add(lower_low);
        }
    }

    pub fn high_count(&self) -> usize {
        self.highs.count
    }

    pub fn low_count(&self) -> usize {
        self.lows.count
    }

    /// Final datums, rounded; MTL uses the unrounded means
    pub fn finish(&self) -> Result<TidalDatums> {
        if self.sample_count == 0 {
            return Err(Error::datum_computation("no samples to aggregate"));
        }

        let (Some(mhhw), Some(mhw)) = (self.higher_highs.value(), self.highs.value()) else {
            return Err(Error::datum_computation(
                "no high waters detected in the synthesized series",
            ));
        };
        let (Some(mllw), Some(mlw)) = (self.lower_lows.value(), self.lows.value()) else {
            return Err(Error::datum_computation(
                "no low waters detected in the synthesized series",
            ));
        };

        let msl = self.sample_sum / self.sample_count as f64;
        let mtl = (mhw + mlw) / 2.0;

        let datums = TidalDatums {
            mhhw: round_datum(mhhw),
            mhw: round_datum(mhw),
            msl: round_datum(msl),
            mtl: round_datum(mtl),
            mlw: round_datum(mlw),
            mllw: round_datum(mllw),
            lat: round_datum(self.minimum),
        };

        if !datums.all_finite() {
            return Err(Error::datum_computation("derived datums are not finite"));
        }
        Ok(datums)
    }
}

/// Round to the published datum precision
pub fn round_datum(value: f64) -> f64 {
    let scale = 10_f64.powi(DATUM_DECIMALS);
    (value * scale).round() / scale
}
