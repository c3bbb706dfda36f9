//! The four deduplication phases
//!
//! Each phase looks only at the entries still active when it starts and
//! reports the entries it removes; the pipeline owns the bookkeeping.

use crate::Result;
use crate::app::models::{GeoPoint, StationCandidate, provider_slug};
use crate::app::services::spatial_index::{NearQuery, SpatialIndex};
use crate::app::services::station_catalog::CatalogIndex;
use crate::config::ProvenanceRule;
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use tracing::debug;

use super::priority::{PriorityKey, compare_priority};
use super::stats::DedupPhase;

/// A candidate that passed validation, with its derived signals
#[derive(Debug, Clone)]
pub(crate) struct BatchEntry<'a> {
    pub candidate: &'a StationCandidate,
    pub id: String,
    pub location: GeoPoint,
    pub key: PriorityKey,
}

impl BatchEntry<'_> {
    pub fn has_caveat(&self) -> bool {
        self.key.has_quality_issues
    }
}

/// An entry removed by a phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Removal {
    pub entry: usize,
    pub phase: DedupPhase,
    pub superseded_by: Option<String>,
}

impl Removal {
    fn new(entry: usize, phase: DedupPhase, superseded_by: Option<String>) -> Self {
        Self {
            entry,
            phase,
            superseded_by,
        }
    }
}

/// Phase 1: drop candidates republished by an aggregator when the primary source is already canonical
pub(crate) fn exclude_republished(
    entries: &[BatchEntry<'_>],
    active: &[usize],
    rules: &[ProvenanceRule],
    primary_present: impl Fn(&str) -> bool,
) -> Vec<Removal> {
    // Rules whose primary provider actually appears in the canonical set
    let live_suffixes: Vec<(String, &str)> = rules
        .iter()
        .filter(|rule| primary_present(&rule.primary_provider))
        .map(|rule| (rule.suffix.to_lowercase(), rule.primary_provider.as_str()))
        .collect();

    if live_suffixes.is_empty() {
        return Vec::new();
    }

    active
        .iter()
        .filter_map(|&i| {
            let suffix = entries[i].candidate.provider_suffix();
            live_suffixes
                .iter()
                .find(|(rule_suffix, _)| *rule_suffix == suffix)
                .map(|(_, primary)| {
                    debug!(
                        "{} republishes {} data already in the catalog",
                        entries[i].id, primary
                    );
                    Removal::new(i, DedupPhase::Provenance, None)
                })
        })
        .collect()
}

/// Phase 2: drop candidates sitting on top of a trusted canonical station
pub(crate) fn exclude_near_trusted(
    entries: &[BatchEntry<'_>],
    active: &[usize],
    canonical: &CatalogIndex<'_>,
    trusted_provider: &str,
    threshold_km: f64,
) -> Result<Vec<Removal>> {
    if canonical.is_empty() {
        return Ok(Vec::new());
    }

    let trusted = provider_slug(trusted_provider);
    let query = NearQuery::within(threshold_km).with_max_results(1);
    let mut removals = Vec::new();

    for &i in active {
        // A re-ingested trusted station is never superseded by its own record
        let hits = canonical.near_matching(entries[i].location, query, |station| {
            station.id != entries[i].id && provider_slug(station.provider()) == trusted
        })?;

        if let Some((station, distance_km)) = hits.first() {
            debug!(
                "{} is {:.1} m from trusted station {}",
                entries[i].id,
                distance_km * 1000.0,
                station.id
            );
            removals.push(Removal::new(
                i,
                DedupPhase::CanonicalProximity,
                Some(station.id.clone()),
            ));
        }
    }

    Ok(removals)
}

/// Phase 3: drop flagged candidates that have any unflagged candidate nearby
pub(crate) fn exclude_quality_superseded(
    entries: &[BatchEntry<'_>],
    active: &[usize],
    threshold_km: f64,
) -> Result<Vec<Removal>> {
    if !active.iter().any(|&i| entries[i].has_caveat()) {
        return Ok(Vec::new());
    }

    let index = build_active_index(entries, active)?;
    let mut removals = Vec::new();

    for (pos, &i) in active.iter().enumerate() {
        if !entries[i].has_caveat() {
            continue;
        }

        let neighbor = index.nearest_filtered(entries[i].location, threshold_km, |other| {
            other != pos && !entries[active[other]].has_caveat()
        })?;

        if let Some(hit) = neighbor {
            let replacement = &entries[active[hit.index]].id;
            debug!(
                "{} has quality caveats and is superseded by {}",
                entries[i].id, replacement
            );
            removals.push(Removal::new(
                i,
                DedupPhase::QualitySuperseded,
                Some(replacement.clone()),
            ));
        }
    }

    Ok(removals)
}

/// Phase 4: single-hop grouping of mutual duplicates, keeping the best-ranked member
///
/// Groups are formed around whichever entry is visited first, so a chain of
/// stations each close to the next may survive partially.
pub(crate) fn remove_mutual_duplicates(
    entries: &[BatchEntry<'_>],
    active: &[usize],
    threshold_km: f64,
    progress_bar: Option<&ProgressBar>,
) -> Result<Vec<Removal>> {
    let index = build_active_index(entries, active)?;
    let query = NearQuery::within(threshold_km).with_max_results(active.len());
    let mut finalized: BTreeSet<usize> = BTreeSet::new();
    let mut removals = Vec::new();

    for (pos, &i) in active.iter().enumerate() {
        if let Some(pb) = progress_bar {
            pb.inc(1);
        }

        if finalized.contains(&pos) {
            continue;
        }

        let neighbors = index.near_filtered(entries[i].location, query, |other| {
            other != pos && !finalized.contains(&other)
        })?;

        let mut group: Vec<usize> = Vec::with_capacity(neighbors.len() + 1);
        group.push(pos);
        group.extend(neighbors.iter().map(|hit| hit.index));
        finalized.extend(group.iter().copied());

        if group.len() == 1 {
            continue;
        }

        group.sort_by(|&a, &b| compare_priority(&entries[active[a]].key, &entries[active[b]].key));
        let keeper = &entries[active[group[0]]].id;

        debug!(
            "Duplicate group around {}: keeping {} over {} other(s)",
            entries[i].id,
            keeper,
            group.len() - 1
        );

        for &loser in &group[1..] {
            removals.push(Removal::new(
                active[loser],
                DedupPhase::MutualDuplicate,
                Some(keeper.clone()),
            ));
        }
    }

    Ok(removals)
}

fn build_active_index(entries: &[BatchEntry<'_>], active: &[usize]) -> Result<SpatialIndex> {
    let points: Vec<GeoPoint> = active.iter().map(|&i| entries[i].location).collect();
    SpatialIndex::build(&points)
}
