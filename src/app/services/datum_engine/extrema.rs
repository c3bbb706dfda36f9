//! High and low water detection within tidal-day windows

use crate::constants::MIN_WINDOW_SAMPLES;

use super::predictor::WaterLevelSample;

/// Highs and lows found in one tidal day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidalDayExtrema {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl TidalDayExtrema {
    pub fn higher_high(&self) -> Option<f64> {
        self.highs.iter().copied().reduce(f64::max)
    }

    pub fn lower_low(&self) -> Option<f64> {
        self.lows.iter().copied().reduce(f64::min)
    }
}

/// Local extrema among the interior samples of one window
///
/// A sample is a high when it is at least as high as both neighbours and
/// strictly higher than one of them, so a flat top yields one high at each
/// edge rather than one per sample. Lows are symmetric.
pub fn find_extrema(heights: &[f64]) -> TidalDayExtrema {
    let mut extrema = TidalDayExtrema::default();
    if heights.len() < MIN_WINDOW_SAMPLES {
        return extrema;
    }

    for window in heights.windows(3) {
        let (prev, h, next) = (window[0], window[1], window[2]);

        if h >= prev && h >= next && (h > prev || h > next) {
            extrema.highs.push(h);
        } else if h <= prev && h <= next && (h < prev || h < next) {
            extrema.lows.push(h);
        }
    }

    extrema
}

/// Split samples into consecutive windows of `window_seconds` measured from the first sample
pub fn tidal_days(samples: &[WaterLevelSample], window_seconds: f64) -> Vec<&[WaterLevelSample]> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };

    let mut days = Vec::new();
    let mut day_start = 0;
    let mut current = 0_i64;

    for (i, sample) in samples.iter().enumerate() {
        let elapsed = (sample.time - first.time).num_seconds() as f64;
        let day = (elapsed / window_seconds).floor() as i64;
        if day != current {
            days.push(&samples[day_start..i]);
            day_start = i;
            current = day;
        }
    }
    days.push(&samples[day_start..]);

    days
}
