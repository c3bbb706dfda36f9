//! Data models for tide station curation
//!
//! This module contains the core data structures for representing tide
//! stations before and after curation, their harmonic constituents, epochs
//! and the tidal datums derived for them.

use crate::constants::DAYS_PER_YEAR;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Geography
// =============================================================================

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validate coordinate ranges
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::invalid_geolocation(
                format!("({}, {})", self.latitude, self.longitude),
                format!(
                    "latitude {} must be between -90 and 90 degrees",
                    self.latitude
                ),
            ));
        }

        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::invalid_geolocation(
                format!("({}, {})", self.latitude, self.longitude),
                format!(
                    "longitude {} must be between -180 and 180 degrees",
                    self.longitude
                ),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Station Metadata
// =============================================================================

/// Whether a station carries its own constituents or offsets from another station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    Reference,
    Subordinate,
}

/// Provider that supplied a station record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSource {
    /// Provider name (e.g. "NOAA", "TICON")
    pub name: String,

    /// Provider URL for the station
    #[serde(default)]
    pub url: String,

    /// Provider-local station identifier
    pub id: String,
}

/// Observation window over which the harmonic analysis is valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Epoch {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Epoch {
    /// Create an epoch, rejecting an end before the start
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let epoch = Self { start, end };
        epoch.validate()?;
        Ok(epoch)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(Error::invalid_epoch(format!(
                "epoch end {} is before start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Length of the epoch in years of 365.25 days
    pub fn length_years(&self) -> f64 {
        let seconds = (self.end - self.start).num_seconds() as f64;
        seconds / (DAYS_PER_YEAR * 86_400.0)
    }
}

/// A named periodic component of the tide signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicConstituent {
    pub name: String,

    /// Amplitude in meters
    pub amplitude: f64,

    /// Phase lag in degrees, [0, 360)
    pub phase: f64,
}

impl HarmonicConstituent {
    pub fn new(name: impl Into<String>, amplitude: f64, phase: f64) -> Self {
        Self {
            name: name.into(),
            amplitude,
            phase,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_constituent(
                &self.name,
                "constituent name cannot be empty",
            ));
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(Error::invalid_constituent(
                &self.name,
                format!("amplitude {} must be finite and >= 0", self.amplitude),
            ));
        }
        if !self.phase.is_finite() || !(0.0..360.0).contains(&self.phase) {
            return Err(Error::invalid_constituent(
                &self.name,
                format!("phase {} must be in [0, 360)", self.phase),
            ));
        }
        Ok(())
    }
}

/// How subordinate height offsets are applied to reference predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightOffsetType {
    Ratio,
    Fixed,
}

/// Height corrections for high and low water
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightOffsets {
    #[serde(rename = "type")]
    pub offset_type: HeightOffsetType,
    pub high: f64,
    pub low: f64,
}

/// Time corrections for high and low water, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeOffsets {
    pub high: f64,
    pub low: f64,
}

/// Offset coefficients tying a subordinate station to its reference station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubordinateOffsets {
    /// Canonical id of the reference station
    pub reference: String,
    pub height: HeightOffsets,
    pub time: TimeOffsets,
}

// =============================================================================
// Station Candidate
// =============================================================================

/// A station produced by ingestion and not yet committed to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCandidate {
    pub name: String,

    #[serde(default)]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default)]
    pub continent: String,

    /// Latitude in WGS84 decimal degrees; absent when the provider omitted it
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Longitude in WGS84 decimal degrees; absent when the provider omitted it
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(rename = "type")]
    pub station_type: StationType,

    pub source: StationSource,

    #[serde(default)]
    pub license: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimers: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Epoch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub harmonic_constituents: Vec<HarmonicConstituent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<SubordinateOffsets>,
}

impl StationCandidate {
    /// Stable catalog key: `{provider-slug}/{provider-local-id}`
    pub fn id(&self) -> String {
        format!("{}/{}", provider_slug(&self.source.name), self.source.id.trim())
    }

    /// Lower-cased text after the last '-' of the provider-local id
    ///
    /// TICON-style ids such as `abashiri-347a-jpn-uhslc` end with the
    /// originating agency.
    pub fn provider_suffix(&self) -> String {
        let id = self.source.id.trim();
        id.rsplit('-').next().unwrap_or(id).to_lowercase()
    }

    /// Coordinates, or an input error when either is missing or out of range
    pub fn location(&self) -> Result<GeoPoint> {
        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            (lat, lon) => {
                let missing = match (lat, lon) {
                    (None, None) => "latitude and longitude",
                    (None, _) => "latitude",
                    _ => "longitude",
                };
                return Err(Error::invalid_geolocation(
                    self.id(),
                    format!("missing {missing}"),
                ));
            }
        };

        let point = GeoPoint::new(latitude, longitude);
        point.validate().map_err(|e| match e {
            Error::InvalidGeolocation { message, .. } => {
                Error::invalid_geolocation(self.id(), message)
            }
            other => other,
        })?;
        Ok(point)
    }

    /// Observation period in years; zero without an epoch
    pub fn observation_years(&self) -> f64 {
        self.epoch.map(|epoch| epoch.length_years()).unwrap_or(0.0)
    }

    pub fn is_reference(&self) -> bool {
        self.station_type == StationType::Reference
    }

    /// Canonical id of the reference station for subordinates
    pub fn reference_id(&self) -> Option<&str> {
        self.offsets.as_ref().map(|offsets| offsets.reference.as_str())
    }

    /// Validate the candidate as a whole
    pub fn validate(&self) -> Result<()> {
        if self.source.id.trim().is_empty() {
            return Err(Error::data_validation(format!(
                "station '{}' has an empty source id",
                self.name
            )));
        }

        self.location()?;

        if let Some(epoch) = &self.epoch {
            epoch.validate()?;
        }

        match self.station_type {
            StationType::Reference => {
                if self.harmonic_constituents.is_empty() {
                    return Err(Error::empty_constituents(format!(
                        "reference station '{}'",
                        self.id()
                    )));
                }
                for constituent in &self.harmonic_constituents {
                    constituent.validate()?;
                }
            }
            StationType::Subordinate => {
                if self.offsets.is_none() {
                    return Err(Error::data_validation(format!(
                        "subordinate station '{}' has no offsets",
                        self.id()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Lower-cased provider name with whitespace collapsed to '-'
pub fn provider_slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

// =============================================================================
// Datums and Canonical Stations
// =============================================================================

/// Standard tidal datums in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TidalDatums {
    /// Mean higher-high water
    #[serde(rename = "MHHW")]
    pub mhhw: f64,
    /// Mean high water
    #[serde(rename = "MHW")]
    pub mhw: f64,
    /// Mean sea level
    #[serde(rename = "MSL")]
    pub msl: f64,
    /// Mean tide level
    #[serde(rename = "MTL")]
    pub mtl: f64,
    /// Mean low water
    #[serde(rename = "MLW")]
    pub mlw: f64,
    /// Mean lower-low water
    #[serde(rename = "MLLW")]
    pub mllw: f64,
    /// Lowest astronomical tide
    #[serde(rename = "LAT")]
    pub lat: f64,
}

impl TidalDatums {
    /// Named datums, highest first
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("MHHW", self.mhhw),
            ("MHW", self.mhw),
            ("MSL", self.msl),
            ("MTL", self.mtl),
            ("MLW", self.mlw),
            ("MLLW", self.mllw),
            ("LAT", self.lat),
        ]
    }

    pub fn as_map(&self) -> BTreeMap<String, f64> {
        self.entries()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    pub fn all_finite(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.is_finite())
    }
}

/// A station that survived curation, with its computed datums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStation {
    pub id: String,

    #[serde(flatten)]
    pub station: StationCandidate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datums: Option<TidalDatums>,

    /// Window the datums were computed over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum_epoch: Option<Epoch>,
}

impl CanonicalStation {
    /// Promote a candidate, attaching datums when it is a reference station
    pub fn promote(
        station: StationCandidate,
        datums: Option<TidalDatums>,
        datum_epoch: Option<Epoch>,
    ) -> Result<Self> {
        if let Some(datums) = &datums {
            if !datums.all_finite() {
                return Err(Error::datum_computation(format!(
                    "station '{}' has non-finite datums",
                    station.id()
                )));
            }
        }

        Ok(Self {
            id: station.id(),
            station,
            datums,
            datum_epoch,
        })
    }

    pub fn provider(&self) -> &str {
        &self.station.source.name
    }

    pub fn is_reference(&self) -> bool {
        self.station.is_reference()
    }
}
