//! Deduplication results and per-phase statistics

use crate::Error;
use crate::app::models::StationCandidate;
use std::fmt;

/// Phase that removed a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupPhase {
    Provenance,
    CanonicalProximity,
    QualitySuperseded,
    MutualDuplicate,
}

impl fmt::Display for DedupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Provenance => "provenance",
            Self::CanonicalProximity => "canonical-proximity",
            Self::QualitySuperseded => "quality-superseded",
            Self::MutualDuplicate => "mutual-duplicate",
        };
        f.write_str(name)
    }
}

/// Number of candidates removed by each phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub provenance_excluded: usize,
    pub canonical_proximity_excluded: usize,
    pub quality_superseded: usize,
    pub mutual_duplicates_removed: usize,
}

impl PhaseCounts {
    pub fn record(&mut self, phase: DedupPhase) {
        match phase {
            DedupPhase::Provenance => self.provenance_excluded += 1,
            DedupPhase::CanonicalProximity => self.canonical_proximity_excluded += 1,
            DedupPhase::QualitySuperseded => self.quality_superseded += 1,
            DedupPhase::MutualDuplicate => self.mutual_duplicates_removed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.provenance_excluded
            + self.canonical_proximity_excluded
            + self.quality_superseded
            + self.mutual_duplicates_removed
    }
}

/// A discarded candidate and the reason it lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedCandidate {
    pub id: String,
    pub phase: DedupPhase,
    /// Station that covers the same slot, when one exists
    pub superseded_by: Option<String>,
}

/// A single bad record; the rest of the batch carries on
#[derive(Debug)]
pub struct CandidateError {
    pub station_id: String,
    pub error: Error,
}

impl CandidateError {
    pub fn new(station_id: impl Into<String>, error: Error) -> Self {
        Self {
            station_id: station_id.into(),
            error,
        }
    }
}

impl fmt::Display for CandidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.station_id, self.error)
    }
}

/// Result of running the deduplication phases over one batch
#[derive(Debug, Default)]
pub struct DedupOutcome {
    /// Survivors in original batch order
    pub surviving: Vec<StationCandidate>,
    /// Candidates removed by a phase, in the order they were removed
    pub discarded: Vec<DiscardedCandidate>,
    pub phase_counts: PhaseCounts,
    /// Candidates rejected before the phases ran
    pub errors: Vec<CandidateError>,
}

impl DedupOutcome {
    /// Ids whose previously persisted records should be deleted
    pub fn discarded_ids(&self) -> Vec<&str> {
        self.discarded.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn surviving_ids(&self) -> Vec<String> {
        self.surviving.iter().map(StationCandidate::id).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Dedup Summary: {} surviving | {} discarded \
             (provenance: {}, canonical proximity: {}, quality superseded: {}, mutual duplicates: {}) | \
             {} rejected",
            self.surviving.len(),
            self.phase_counts.total(),
            self.phase_counts.provenance_excluded,
            self.phase_counts.canonical_proximity_excluded,
            self.phase_counts.quality_superseded,
            self.phase_counts.mutual_duplicates_removed,
            self.errors.len()
        )
    }
}
