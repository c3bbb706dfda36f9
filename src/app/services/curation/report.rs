//! Curation run results

use crate::app::services::station_dedup::{CandidateError, DiscardedCandidate, PhaseCounts};

/// Counters for one curation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurationStats {
    pub candidates_received: usize,
    pub candidates_enriched: usize,
    pub subordinates_unresolved: usize,
    pub datum_failures: usize,
    /// Stations that shared constituents and window with an earlier one
    pub datum_memo_hits: usize,
    pub processing_time_ms: u128,
}

/// Outcome of committing one batch to the catalog
#[derive(Debug, Default)]
pub struct CurationReport {
    /// Ids written to the catalog, in batch order
    pub committed_ids: Vec<String>,
    /// Ids deleted from the catalog because deduplication discarded them
    pub discarded_ids: Vec<String>,
    pub discarded: Vec<DiscardedCandidate>,
    pub phase_counts: PhaseCounts,
    pub datums_computed: usize,
    pub datums_reused: usize,
    /// Per-station problems; none of these stations were committed
    pub errors: Vec<CandidateError>,
    pub stats: CurationStats,
}

impl CurationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Curation Summary: {} received | {} committed | {} discarded | \
             {} datums computed, {} reused | {} errors | {}ms",
            self.stats.candidates_received,
            self.committed_ids.len(),
            self.phase_counts.total(),
            self.datums_computed,
            self.datums_reused,
            self.errors.len(),
            self.stats.processing_time_ms
        )
    }
}
