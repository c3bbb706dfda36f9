//! Station deduplication for incoming provider batches
//!
//! This module decides which candidates from one ingestion run are admitted to
//! the canonical catalog. Phases run strictly in order and each only sees the
//! candidates that survived the previous ones:
//!
//! 1. **Provenance**: drop aggregator copies of a provider already ingested directly
//! 2. **Canonical proximity**: drop candidates next to a trusted canonical station
//! 3. **Quality superseded**: drop caveated candidates next to a clean one
//! 4. **Mutual duplicates**: single-hop grouping, best-ranked member survives
//!
//! The batch order is load-bearing: phase 4 groups around whichever candidate
//! is visited first, so callers must pass candidates in a stable order.

use crate::app::models::StationCandidate;
use crate::app::services::station_catalog::StationCatalog;
use crate::config::DedupConfig;
use crate::Result;
use indicatif::ProgressBar;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

pub mod phases;
pub mod priority;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use priority::{
    PriorityKey, QualityCaveatMatcher, compare_candidates, compare_priority,
};
pub use stats::{CandidateError, DedupOutcome, DedupPhase, DiscardedCandidate, PhaseCounts};

use phases::{BatchEntry, Removal};

/// Run all deduplication phases over `batch` against the `canonical` set
pub fn deduplicate(
    canonical: &StationCatalog,
    batch: &[StationCandidate],
    config: &DedupConfig,
) -> Result<DedupOutcome> {
    deduplicate_with_progress(canonical, batch, config, None)
}

/// Same as [`deduplicate`], advancing `progress_bar` once per candidate in phase 4
pub fn deduplicate_with_progress(
    canonical: &StationCatalog,
    batch: &[StationCandidate],
    config: &DedupConfig,
    progress_bar: Option<&ProgressBar>,
) -> Result<DedupOutcome> {
    let matcher = QualityCaveatMatcher::new(&config.quality_caveat_pattern)?;
    let thresholds = &config.thresholds;

    info!(
        "Deduplicating {} candidates against {} canonical stations",
        batch.len(),
        canonical.len()
    );

    let mut outcome = DedupOutcome::default();
    let entries = prepare_entries(batch, &matcher, config.strict_geolocation, &mut outcome)?;

    // Bookkeeping lives in this call only
    let mut removed: BTreeSet<usize> = BTreeSet::new();

    // Phase 1: provenance
    let active = active_entries(entries.len(), &removed);
    let removals = phases::exclude_republished(
        &entries,
        &active,
        &config.provenance_rules,
        |provider| canonical.has_provider(provider),
    );
    apply_removals(&entries, removals, &mut removed, &mut outcome);

    // Phase 2: canonical proximity
    let active = active_entries(entries.len(), &removed);
    let canonical_index = canonical.spatial_index()?;
    let removals = phases::exclude_near_trusted(
        &entries,
        &active,
        &canonical_index,
        &config.trusted_provider,
        thresholds.trusted_proximity_km,
    )?;
    apply_removals(&entries, removals, &mut removed, &mut outcome);

    // Phase 3: quality superseded (index rebuilt over the remaining candidates)
    let active = active_entries(entries.len(), &removed);
    let removals =
        phases::exclude_quality_superseded(&entries, &active, thresholds.quality_superseded_km)?;
    apply_removals(&entries, removals, &mut removed, &mut outcome);

    // Phase 4: mutual duplicates (index rebuilt again)
    let active = active_entries(entries.len(), &removed);
    let removals = phases::remove_mutual_duplicates(
        &entries,
        &active,
        thresholds.mutual_duplicate_km,
        progress_bar,
    )?;
    apply_removals(&entries, removals, &mut removed, &mut outcome);

    outcome.surviving = active_entries(entries.len(), &removed)
        .into_iter()
        .map(|i| entries[i].candidate.clone())
        .collect();

    let counts = &outcome.phase_counts;
    info!(
        "Dedup phases complete: provenance-excluded={}, canonical-proximity-excluded={}, \
         quality-superseded={}, mutual-duplicates-removed={}, surviving={}",
        counts.provenance_excluded,
        counts.canonical_proximity_excluded,
        counts.quality_superseded,
        counts.mutual_duplicates_removed,
        outcome.surviving.len()
    );

    Ok(outcome)
}

/// Validate coordinates, records and ids, deriving ranking signals for usable candidates
fn prepare_entries<'a>(
    batch: &'a [StationCandidate],
    matcher: &QualityCaveatMatcher,
    strict_geolocation: bool,
    outcome: &mut DedupOutcome,
) -> Result<Vec<BatchEntry<'a>>> {
    let mut entries = Vec::with_capacity(batch.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(batch.len());

    for candidate in batch {
        let id = candidate.id();

        let location = match candidate.location() {
            Ok(location) => location,
            Err(error) if strict_geolocation => return Err(error),
            Err(error) => {
                warn!("Rejecting candidate {}: {}", id, error);
                outcome.errors.push(CandidateError::new(id, error));
                continue;
            }
        };

        // Invalid records never take part in a phase, so they cannot displace valid ones
        if let Err(error) = candidate.validate() {
            warn!("Rejecting candidate {}: {}", id, error);
            outcome.errors.push(CandidateError::new(id, error));
            continue;
        }

        if !seen.insert(id.clone()) {
            warn!("Rejecting candidate {}: duplicate id in batch", id);
            outcome.errors.push(CandidateError::new(
                id.clone(),
                crate::Error::data_validation(format!("duplicate station id '{id}' in batch")),
            ));
            continue;
        }

        entries.push(BatchEntry {
            candidate,
            key: PriorityKey::for_candidate(candidate, matcher),
            id,
            location,
        });
    }

    Ok(entries)
}

fn active_entries(total: usize, removed: &BTreeSet<usize>) -> Vec<usize> {
    (0..total).filter(|i| !removed.contains(i)).collect()
}

fn apply_removals(
    entries: &[BatchEntry<'_>],
    removals: Vec<Removal>,
    removed: &mut BTreeSet<usize>,
    outcome: &mut DedupOutcome,
) {
    for removal in removals {
        if !removed.insert(removal.entry) {
            continue;
        }
        let id = entries[removal.entry].id.clone();
        debug!("Discarded {} in {} phase", id, removal.phase);
        outcome.phase_counts.record(removal.phase);
        outcome.discarded.push(DiscardedCandidate {
            id,
            phase: removal.phase,
            superseded_by: removal.superseded_by,
        });
    }
}
