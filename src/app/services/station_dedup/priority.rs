//! Priority rules for competing station records
//!
//! When two records claim the same geographic slot, the one that ranks first
//! wins. Rules, first difference wins:
//! 1. No quality-control caveat in the disclaimers beats having one
//! 2. Longer observation epoch beats shorter
//! 3. Lower source priority rank (by provider-id suffix) beats higher
//! 4. Lexicographically smaller station id

use crate::app::models::StationCandidate;
use crate::constants::source_rank;
use crate::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;

/// Detects quality-control caveats in free-text disclaimers
#[derive(Debug, Clone)]
pub struct QualityCaveatMatcher {
    pattern: Regex,
}

impl QualityCaveatMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::configuration(format!("Invalid quality caveat pattern: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn has_caveat(&self, disclaimers: Option<&str>) -> bool {
        disclaimers.is_some_and(|text| self.pattern.is_match(text))
    }
}

/// Ranking signals derived from a candidate
#[derive(Debug, Clone)]
pub struct PriorityKey {
    pub has_quality_issues: bool,
    pub observation_years: f64,
    pub source_rank: i32,
    pub source_id: String,
}

impl PriorityKey {
    pub fn for_candidate(candidate: &StationCandidate, matcher: &QualityCaveatMatcher) -> Self {
        Self {
            has_quality_issues: matcher.has_caveat(candidate.disclaimers.as_deref()),
            observation_years: candidate.observation_years(),
            source_rank: source_rank::for_suffix(&candidate.provider_suffix()),
            source_id: candidate.id(),
        }
    }
}

/// Three-way comparison; `Less` means `a` outranks `b`
pub fn compare_priority(a: &PriorityKey, b: &PriorityKey) -> Ordering {
    a.has_quality_issues
        .cmp(&b.has_quality_issues)
        .then_with(|| b.observation_years.total_cmp(&a.observation_years))
        .then_with(|| a.source_rank.cmp(&b.source_rank))
        .then_with(|| a.source_id.cmp(&b.source_id))
}

/// Compare two candidates directly
pub fn compare_candidates(
    a: &StationCandidate,
    b: &StationCandidate,
    matcher: &QualityCaveatMatcher,
) -> Ordering {
    compare_priority(
        &PriorityKey::for_candidate(a, matcher),
        &PriorityKey::for_candidate(b, matcher),
    )
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        compare_priority(self, other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_priority(self, other)
    }
}
