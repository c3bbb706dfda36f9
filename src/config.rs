//! Configuration management and validation.
//!
//! Provides configuration structures for deduplication thresholds, datum
//! synthesis parameters, enrichment and worker settings, loadable from TOML.

use crate::constants::{
    DEFAULT_MUTUAL_DUPLICATE_KM, DEFAULT_PLACE_LOOKUP_KM, DEFAULT_PROVENANCE_RULES,
    DEFAULT_QUALITY_CAVEAT_PATTERN, DEFAULT_QUALITY_SUPERSEDED_KM, DEFAULT_STEP_SECONDS,
    DEFAULT_TIDAL_DAY_HOURS, DEFAULT_TRUSTED_PROVIDER, DEFAULT_TRUSTED_PROXIMITY_KM,
    NODAL_CYCLE_YEARS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Distance thresholds used by the deduplication phases (kilometres)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupThresholds {
    /// Phase 2: radius around trusted canonical stations
    pub trusted_proximity_km: f64,

    /// Phase 3: radius in which an unflagged candidate supersedes a flagged one
    pub quality_superseded_km: f64,

    /// Phase 4: single-hop radius for mutual duplicates
    pub mutual_duplicate_km: f64,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            trusted_proximity_km: DEFAULT_TRUSTED_PROXIMITY_KM,
            quality_superseded_km: DEFAULT_QUALITY_SUPERSEDED_KM,
            mutual_duplicate_km: DEFAULT_MUTUAL_DUPLICATE_KM,
        }
    }
}

/// A provider suffix that marks data republished from a primary provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRule {
    /// Lower-cased provider-id suffix on the candidate (e.g. "noaa")
    pub suffix: String,

    /// Provider name that publishes the same data directly (e.g. "NOAA")
    pub primary_provider: String,
}

/// Deduplication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub thresholds: DedupThresholds,

    /// Canonical provider trusted over any nearby candidate
    pub trusted_provider: String,

    /// Secondary-aggregator rules applied in the provenance phase
    pub provenance_rules: Vec<ProvenanceRule>,

    /// Regex marking a quality-control caveat in disclaimers
    pub quality_caveat_pattern: String,

    /// Abort the whole batch on the first candidate with bad coordinates
    pub strict_geolocation: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            thresholds: DedupThresholds::default(),
            trusted_provider: DEFAULT_TRUSTED_PROVIDER.to_string(),
            provenance_rules: DEFAULT_PROVENANCE_RULES
                .iter()
                .map(|(suffix, primary)| ProvenanceRule {
                    suffix: suffix.to_string(),
                    primary_provider: primary.to_string(),
                })
                .collect(),
            quality_caveat_pattern: DEFAULT_QUALITY_CAVEAT_PATTERN.to_string(),
            strict_geolocation: false,
        }
    }
}

/// Synthetic datum configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatumConfig {
    /// Spacing of synthesized samples in seconds
    pub step_seconds: i64,

    /// Length of one tidal day in hours
    pub tidal_day_hours: f64,

    /// Maximum analysis window length in years
    pub epoch_years: u32,
}

impl Default for DatumConfig {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECONDS,
            tidal_day_hours: DEFAULT_TIDAL_DAY_HOURS,
            epoch_years: NODAL_CYCLE_YEARS,
        }
    }
}

/// Place-metadata enrichment configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Search radius passed to the place lookup
    pub max_distance_km: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_PLACE_LOOKUP_KM,
        }
    }
}

/// Worker configuration for datum computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of concurrent datum computations
    pub workers: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }
}

/// Global configuration for a curation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub dedup: DedupConfig,
    pub datums: DatumConfig,
    pub enrichment: EnrichmentConfig,
    pub performance: PerformanceConfig,
}

impl CatalogConfig {
    /// Load configuration from a TOML file, filling omitted fields with defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let thresholds = &self.dedup.thresholds;
        for (name, value) in [
            ("trusted_proximity_km", thresholds.trusted_proximity_km),
            ("quality_superseded_km", thresholds.quality_superseded_km),
            ("mutual_duplicate_km", thresholds.mutual_duplicate_km),
            ("max_distance_km", self.enrichment.max_distance_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::configuration(format!(
                    "{name} must be a finite, non-negative distance (got {value})"
                )));
            }
        }

        if self.dedup.trusted_provider.trim().is_empty() {
            return Err(Error::configuration("trusted_provider cannot be empty"));
        }

        regex::Regex::new(&self.dedup.quality_caveat_pattern).map_err(|e| {
            Error::configuration(format!("Invalid quality_caveat_pattern: {e}"))
        })?;

        if self.datums.step_seconds <= 0 {
            return Err(Error::configuration(format!(
                "step_seconds must be positive (got {})",
                self.datums.step_seconds
            )));
        }

        if !self.datums.tidal_day_hours.is_finite() || self.datums.tidal_day_hours <= 0.0 {
            return Err(Error::configuration(format!(
                "tidal_day_hours must be positive (got {})",
                self.datums.tidal_day_hours
            )));
        }

        if self.datums.epoch_years == 0 {
            return Err(Error::configuration("epoch_years must be at least 1"));
        }

        if self.performance.workers == 0 {
            return Err(Error::configuration("workers must be at least 1"));
        }

        Ok(())
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.performance.workers = workers;
        self
    }

    /// Create configuration with custom dedup thresholds
    pub fn with_thresholds(mut self, thresholds: DedupThresholds) -> Self {
        self.dedup.thresholds = thresholds;
        self
    }

    /// Create configuration with a different trusted provider
    pub fn with_trusted_provider(mut self, provider: impl Into<String>) -> Self {
        self.dedup.trusted_provider = provider.into();
        self
    }

    /// Abort batches on invalid coordinates instead of collecting errors
    pub fn with_strict_geolocation(mut self) -> Self {
        self.dedup.strict_geolocation = true;
        self
    }

    /// Create configuration with a custom synthesis step
    pub fn with_step_seconds(mut self, step_seconds: i64) -> Self {
        self.datums.step_seconds = step_seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dedup.thresholds.mutual_duplicate_km, 0.05);
        assert_eq!(config.dedup.trusted_provider, "NOAA");
        assert_eq!(config.datums.epoch_years, 19);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CatalogConfig::from_toml_str(
            r#"
            [dedup.thresholds]
            mutual_duplicate_km = 0.02

            [performance]
            workers = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.dedup.thresholds.mutual_duplicate_km, 0.02);
        assert_eq!(config.dedup.thresholds.trusted_proximity_km, 0.1);
        assert_eq!(config.performance.workers, 2);
        assert_eq!(config.datums.step_seconds, 3600);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let negative = CatalogConfig::default().with_thresholds(DedupThresholds {
            mutual_duplicate_km: -1.0,
            ..DedupThresholds::default()
        });
        assert!(matches!(
            negative.validate(),
            Err(Error::Configuration { .. })
        ));

        assert!(CatalogConfig::default().with_workers(0).validate().is_err());
        assert!(CatalogConfig::default().with_step_seconds(0).validate().is_err());

        let mut bad_pattern = CatalogConfig::default();
        bad_pattern.dedup.quality_caveat_pattern = "(unclosed".to_string();
        assert!(bad_pattern.validate().is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "[dedup]\ntrusted_provider = \"BODC\"\n").unwrap();

        let config = CatalogConfig::from_file(&path).unwrap();
        assert_eq!(config.dedup.trusted_provider, "BODC");
        assert_eq!(config.dedup.provenance_rules.len(), 1);
    }
}
