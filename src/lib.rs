//! Tide Catalog Library
//!
//! A Rust library for curating a global catalog of tide-prediction stations
//! supplied by many independent providers into one de-duplicated, internally
//! consistent dataset.
//!
//! This library provides tools for:
//! - Indexing station coordinates for great-circle nearest-neighbour queries
//! - Ranking conflicting station records by data-quality signals
//! - Multi-phase deduplication of a candidate batch against the canonical set
//! - Deriving synthetic tidal datums (MHHW, MSL, MLLW, ...) from harmonic constituents
//! - Enriching candidates with place metadata and committing them to the catalog

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod curation;
        pub mod datum_engine;
        pub mod spatial_index;
        pub mod station_catalog;
        pub mod station_dedup;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use app::models::{CanonicalStation, GeoPoint, HarmonicConstituent, StationCandidate};
pub use config::CatalogConfig;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for station curation and datum computation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Station lacks usable coordinates
    #[error("Invalid geolocation for station '{station_id}': {message}")]
    InvalidGeolocation { station_id: String, message: String },

    /// Reference station without harmonic constituents
    #[error("Empty constituent list: {context}")]
    EmptyConstituents { context: String },

    /// Constituent with out-of-range amplitude or phase
    #[error("Invalid harmonic constituent '{name}': {message}")]
    InvalidConstituent { name: String, message: String },

    /// Epoch that cannot describe an analysis window
    #[error("Invalid epoch: {message}")]
    InvalidEpoch { message: String },

    /// Synthesized series is empty or inconsistent
    #[error("Synthesized series mismatch: {message}")]
    SeriesMismatch { message: String },

    /// Datums could not be derived from the series
    #[error("Datum computation error: {message}")]
    DatumComputation { message: String },

    /// Subordinate station pointing at a missing or non-reference station
    #[error("Station '{station_id}' references unknown reference station '{reference_id}'")]
    UnresolvedReference {
        station_id: String,
        reference_id: String,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid geolocation error
    pub fn invalid_geolocation(station_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGeolocation {
            station_id: station_id.into(),
            message: message.into(),
        }
    }

    /// Create an empty constituent list error
    pub fn empty_constituents(context: impl Into<String>) -> Self {
        Self::EmptyConstituents {
            context: context.into(),
        }
    }

    /// Create an invalid constituent error
    pub fn invalid_constituent(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstituent {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid epoch error
    pub fn invalid_epoch(message: impl Into<String>) -> Self {
        Self::InvalidEpoch {
            message: message.into(),
        }
    }

    /// Create a series mismatch error
    pub fn series_mismatch(message: impl Into<String>) -> Self {
        Self::SeriesMismatch {
            message: message.into(),
        }
    }

    /// Create a datum computation error
    pub fn datum_computation(message: impl Into<String>) -> Self {
        Self::DatumComputation {
            message: message.into(),
        }
    }

    /// Create an unresolved reference error
    pub fn unresolved_reference(
        station_id: impl Into<String>,
        reference_id: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            station_id: station_id.into(),
            reference_id: reference_id.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// True for errors that describe a single bad record rather than a broken run
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeolocation { .. }
                | Self::EmptyConstituents { .. }
                | Self::InvalidConstituent { .. }
                | Self::InvalidEpoch { .. }
                | Self::SeriesMismatch { .. }
                | Self::DatumComputation { .. }
                | Self::DataValidation { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("TOML parsing failed: {error}"),
        }
    }
}
