//! Application constants for the tide catalog
//!
//! This module contains default thresholds, provider rankings and tidal
//! constants used throughout curation and datum computation.

// =============================================================================
// Geodesy
// =============================================================================

/// Mean Earth radius used by the haversine formula (kilometres)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default number of results returned by a general proximity lookup
pub const DEFAULT_MAX_RESULTS: usize = 10;

// =============================================================================
// Deduplication Thresholds
// =============================================================================

/// Candidates this close to a trusted canonical station are dropped (phase 2)
pub const DEFAULT_TRUSTED_PROXIMITY_KM: f64 = 0.1;

/// Flagged candidates this close to an unflagged one are dropped (phase 3)
pub const DEFAULT_QUALITY_SUPERSEDED_KM: f64 = 0.1;

/// Candidates this close to each other form a duplicate group (phase 4)
pub const DEFAULT_MUTUAL_DUPLICATE_KM: f64 = 0.05;

/// Provider whose canonical stations outrank any nearby candidate
pub const DEFAULT_TRUSTED_PROVIDER: &str = "NOAA";

/// Case-insensitive pattern marking a quality-control caveat in disclaimers
///
/// Only negative or pending phrasing counts; "passed QC" is not a caveat.
pub const DEFAULT_QUALITY_CAVEAT_PATTERN: &str = concat!(
    r"(?i)\b(?:not|no|never|without)\b[\w\s-]{0,30}\b(?:qc|quality[\s-]*control(?:led)?)\b",
    r"|\b(?:qc|quality[\s-]*control(?:led)?)\s+(?:pending|incomplete|not\s+(?:yet\s+)?(?:applied|performed|done))\b",
    r"|\bnot\s+(?:been\s+)?verified\b|\bunverified\b",
);

/// Provider-id suffixes that republish a primary provider's data: (suffix, primary provider)
pub const DEFAULT_PROVENANCE_RULES: &[(&str, &str)] = &[("noaa", "NOAA")];

// =============================================================================
// Source Priority Ranks
// =============================================================================

/// Source priority tiers keyed by provider-id suffix (lower = preferred)
pub mod source_rank {
    /// Best known tier
    pub const BEST: i32 = 1;

    /// Worst known tier
    pub const WORST: i32 = 5;

    /// Tier for suffixes missing from the table
    pub const UNKNOWN: i32 = 3;

    /// Known provider suffixes and their tiers
    pub const TABLE: &[(&str, i32)] = &[
        ("uhslc", 1),
        ("noaa", 1),
        ("bodc", 2),
        ("meds", 2),
        ("jma", 2),
        ("bom", 2),
        ("linz", 2),
        ("shom", 2),
        ("ispra", 4),
        ("ioc", 4),
        ("gloss", 4),
        ("psmsl", 5),
    ];

    /// Look up the tier for a lower-cased provider suffix
    pub fn for_suffix(suffix: &str) -> i32 {
        TABLE
            .iter()
            .find(|(known, _)| *known == suffix)
            .map(|(_, rank)| *rank)
            .unwrap_or(UNKNOWN)
    }
}

// =============================================================================
// Tidal Datums
// =============================================================================

/// Length of the standard datum averaging window (one lunar nodal cycle)
pub const NODAL_CYCLE_YEARS: u32 = 19;

/// Default spacing of synthesized samples (one hour)
pub const DEFAULT_STEP_SECONDS: i64 = 3600;

/// Default tidal (lunar) day length in hours
pub const DEFAULT_TIDAL_DAY_HOURS: f64 = 24.833_333_3;

/// Minimum number of samples a tidal day needs before extrema are searched
pub const MIN_WINDOW_SAMPLES: usize = 3;

/// Datums are rounded to this many decimal places (millimetres)
pub const DATUM_DECIMALS: i32 = 3;

/// Days per year used when converting an epoch span into years
pub const DAYS_PER_YEAR: f64 = 365.25;

// =============================================================================
// Enrichment
// =============================================================================

/// Default search radius for place lookups when filling missing metadata
pub const DEFAULT_PLACE_LOOKUP_KM: f64 = 200.0;
