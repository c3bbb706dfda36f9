//! Curation pipeline: enrichment, deduplication, resolution, datums, commit

use crate::app::models::{CanonicalStation, Epoch, HarmonicConstituent, StationCandidate, TidalDatums};
use crate::app::services::datum_engine::{
    DatumOptions, DatumsResult, HarmonicPredictor, compute_datums, resolve_window,
};
use crate::app::services::station_catalog::StationCatalog;
use crate::app::services::station_dedup::{CandidateError, deduplicate_with_progress};
use crate::config::CatalogConfig;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::enrichment::{PlaceLookup, enrich_candidates};
use super::report::CurationReport;
use super::resolution::{ReferenceSet, resolve_subordinates};

/// Datums attached to one surviving candidate
#[derive(Debug, Clone)]
enum DatumSlot {
    /// Subordinate stations carry no datums of their own
    NotApplicable,
    Ready(TidalDatums, Epoch),
    Failed,
}

/// Identical constituents over the same window always give the same datums
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DatumKey {
    constituents: Vec<(String, u64, u64)>,
    window: Epoch,
}

impl DatumKey {
    fn new(constituents: &[HarmonicConstituent], window: Epoch) -> Self {
        Self {
            constituents: constituents
                .iter()
                .map(|c| {
                    (
                        c.name.trim().to_uppercase(),
                        c.amplitude.to_bits(),
                        c.phase.to_bits(),
                    )
                })
                .collect(),
            window,
        }
    }
}

struct DatumJob {
    constituents: Vec<HarmonicConstituent>,
    window: Epoch,
    /// Positions in the survivor list sharing this job
    members: Vec<usize>,
}

/// Curates incoming batches into a canonical catalog
pub struct CurationPipeline {
    config: CatalogConfig,
    predictor: Arc<dyn HarmonicPredictor>,
    place_lookup: Option<Arc<dyn PlaceLookup>>,
    cancellation: CancellationToken,
    show_progress: bool,
    now: Option<DateTime<Utc>>,
}

impl CurationPipeline {
    pub fn new(config: CatalogConfig, predictor: Arc<dyn HarmonicPredictor>) -> Self {
        Self {
            config,
            predictor,
            place_lookup: None,
            cancellation: CancellationToken::new(),
            show_progress: false,
            now: None,
        }
    }

    /// Fill blank place fields before deduplication
    pub fn with_place_lookup(mut self, lookup: Arc<dyn PlaceLookup>) -> Self {
        self.place_lookup = Some(lookup);
        self
    }

    /// Abort before commit once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Reference instant for stations without an epoch (defaults to now)
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Curate `batch` into `catalog`
    ///
    /// Per-station problems are collected in the report and the station is
    /// left out. The catalog is only replaced once the updated set passes
    /// reference validation, so a failed run leaves it untouched.
    pub async fn run(
        &self,
        catalog: &mut StationCatalog,
        mut batch: Vec<StationCandidate>,
    ) -> Result<CurationReport> {
        self.config.validate()?;
        let started = Instant::now();

        let mut report = CurationReport::default();
        report.stats.candidates_received = batch.len();
        info!(
            "Curating {} candidates into a catalog of {} stations",
            batch.len(),
            catalog.len()
        );

        // Step 1: enrichment
        if let Some(lookup) = &self.place_lookup {
            let enriched = enrich_candidates(
                &mut batch,
                lookup.as_ref(),
                self.config.enrichment.max_distance_km,
            );
            info!("Enriched {} candidates with place metadata", enriched);
            report.stats.candidates_enriched = enriched;
        }

        // Step 2: deduplication
        let dedup_pb = self.progress_bar(batch.len() as u64, "Grouping duplicates");
        let outcome =
            deduplicate_with_progress(catalog, &batch, &self.config.dedup, dedup_pb.as_ref())?;
        if let Some(pb) = dedup_pb {
            pb.finish_and_clear();
        }
        self.check_cancelled()?;

        report.phase_counts = outcome.phase_counts;
        report.discarded_ids = outcome.discarded.iter().map(|d| d.id.clone()).collect();
        report.discarded = outcome.discarded;
        report.errors.extend(outcome.errors);

        // Deduplication already rejected invalid records
        let survivors = outcome.surviving;

        // Step 3: subordinate resolution
        let mut references =
            ReferenceSet::new(catalog, &survivors, report.discarded_ids.iter().cloned());
        let (survivors, unresolved) = resolve_subordinates(survivors, &references);
        report.stats.subordinates_unresolved += unresolved.len();
        report.errors.extend(unresolved);

        // Step 4: datums
        let slots = self.compute_datums(catalog, &survivors, &mut report).await?;
        self.check_cancelled()?;

        let mut ready = Vec::with_capacity(survivors.len());
        for (candidate, slot) in survivors.into_iter().zip(slots) {
            match slot {
                DatumSlot::Failed => references.withdraw(&candidate.id()),
                DatumSlot::NotApplicable => ready.push((candidate, None)),
                DatumSlot::Ready(datums, epoch) => ready.push((candidate, Some((datums, epoch)))),
            }
        }

        // Subordinates of references whose datums failed cannot be committed either
        let (candidates, with_datums): (Vec<_>, Vec<_>) = ready.into_iter().unzip();
        let mut datums_by_id: HashMap<String, (TidalDatums, Epoch)> = candidates
            .iter()
            .zip(with_datums)
            .filter_map(|(candidate, datums)| datums.map(|d| (candidate.id(), d)))
            .collect();
        let (candidates, unresolved) = resolve_subordinates(candidates, &references);
        report.stats.subordinates_unresolved += unresolved.len();
        report.errors.extend(unresolved);
        drop(references);

        // Step 5: commit
        let mut next = catalog.clone();
        for id in &report.discarded_ids {
            if next.remove(id).is_some() {
                debug!("Removed discarded station {} from catalog", id);
            }
        }

        for candidate in candidates {
            let id = candidate.id();
            let (datums, datum_epoch) = match datums_by_id.remove(&id) {
                Some((datums, epoch)) => (Some(datums), Some(epoch)),
                None => (None, None),
            };
            next.insert(CanonicalStation::promote(candidate, datums, datum_epoch)?)?;
            report.committed_ids.push(id);
        }

        next.validate_references()?;
        *catalog = next;

        report.stats.processing_time_ms = started.elapsed().as_millis();
        info!("{}", report.summary());
        Ok(report)
    }

    /// Datums for every surviving reference station, in survivor order
    async fn compute_datums(
        &self,
        catalog: &StationCatalog,
        survivors: &[StationCandidate],
        report: &mut CurationReport,
    ) -> Result<Vec<DatumSlot>> {
        let now = self.now.unwrap_or_else(Utc::now);
        let options = DatumOptions::from(&self.config.datums).with_now(now);

        let mut slots = vec![DatumSlot::NotApplicable; survivors.len()];
        let mut jobs: Vec<DatumJob> = Vec::new();
        let mut job_by_key: HashMap<DatumKey, usize> = HashMap::new();

        for (pos, candidate) in survivors.iter().enumerate() {
            if !candidate.is_reference() {
                continue;
            }

            if let Some((datums, epoch)) =
                reusable_datums(catalog, candidate, options.epoch_years)
            {
                debug!("Reusing stored datums for {}", candidate.id());
                report.datums_reused += 1;
                slots[pos] = DatumSlot::Ready(datums, epoch);
                continue;
            }

            let window = match resolve_window(candidate.epoch.as_ref(), options.epoch_years, now) {
                Ok(window) => window,
                Err(error) => {
                    self.record_datum_failure(report, candidate, error);
                    slots[pos] = DatumSlot::Failed;
                    continue;
                }
            };

            let key = DatumKey::new(&candidate.harmonic_constituents, window);
            match job_by_key.get(&key) {
                Some(&job) => jobs[job].members.push(pos),
                None => {
                    job_by_key.insert(key, jobs.len());
                    jobs.push(DatumJob {
                        constituents: candidate.harmonic_constituents.clone(),
                        window,
                        members: vec![pos],
                    });
                }
            }
        }

        if jobs.is_empty() {
            return Ok(slots);
        }

        let workers = self.config.performance.workers.max(1);
        info!(
            "Computing datums for {} stations ({} distinct) with {} workers",
            jobs.iter().map(|job| job.members.len()).sum::<usize>(),
            jobs.len(),
            workers
        );

        let pb = self.progress_bar(jobs.len() as u64, "Computing datums");
        let mut results: Vec<(usize, Result<DatumsResult>)> =
            stream::iter(jobs.iter().enumerate())
                .map(|(job_index, job)| {
                    let predictor = Arc::clone(&self.predictor);
                    let token = self.cancellation.clone();
                    let constituents = job.constituents.clone();
                    let window = job.window;
                    let pb = pb.clone();
                    async move {
                        if token.is_cancelled() {
                            return (
                                job_index,
                                Err(Error::processing_interrupted("datum computation cancelled")),
                            );
                        }

                        let result = task::spawn_blocking(move || {
                            compute_datums(predictor.as_ref(), &constituents, Some(&window), &options)
                        })
                        .await
                        .unwrap_or_else(|e| {
                            Err(Error::datum_computation(format!("datum worker failed: {e}")))
                        });

                        if let Some(pb) = &pb {
                            pb.inc(1);
                        }
                        (job_index, result)
                    }
                })
                .buffer_unordered(workers)
                .collect()
                .await;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        // Completion order is arbitrary; restore batch order before filling slots
        results.sort_by_key(|(job_index, _)| *job_index);

        for (job_index, result) in results {
            let members = &jobs[job_index].members;
            match result {
                Ok(computed) => {
                    report.datums_computed += 1;
                    report.stats.datum_memo_hits += members.len() - 1;
                    for &pos in members {
                        slots[pos] = DatumSlot::Ready(computed.datums, computed.epoch());
                    }
                }
                Err(error) => {
                    let first_id = survivors[members[0]].id();
                    let message = error.to_string();
                    self.record_datum_failure(report, &survivors[members[0]], error);
                    slots[members[0]] = DatumSlot::Failed;

                    for &pos in &members[1..] {
                        let shared = Error::datum_computation(format!(
                            "same constituents as {first_id}: {message}"
                        ));
                        self.record_datum_failure(report, &survivors[pos], shared);
                        slots[pos] = DatumSlot::Failed;
                    }
                }
            }
        }

        Ok(slots)
    }

    fn record_datum_failure(
        &self,
        report: &mut CurationReport,
        candidate: &StationCandidate,
        error: Error,
    ) {
        warn!("Datum computation failed for {}: {}", candidate.id(), error);
        report.stats.datum_failures += 1;
        report.errors.push(CandidateError::new(candidate.id(), error));
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(Error::processing_interrupted(
                "curation cancelled before commit",
            ));
        }
        Ok(())
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> Option<ProgressBar> {
        if !self.show_progress || len == 0 {
            return None;
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message);
        Some(pb)
    }
}

/// Stored datums for an unchanged reference station
///
/// The stored window must still be the one `epoch_years` would resolve to,
/// anchored at its own end so stations without an epoch are not recomputed
/// just because time has passed. Sampling step and tidal-day length are not
/// stored; changing them needs a catalog without datums to take effect.
fn reusable_datums(
    catalog: &StationCatalog,
    candidate: &StationCandidate,
    epoch_years: u32,
) -> Option<(TidalDatums, Epoch)> {
    let existing = catalog.get(&candidate.id())?;
    if !existing.is_reference()
        || existing.station.harmonic_constituents != candidate.harmonic_constituents
        || existing.station.epoch != candidate.epoch
    {
        return None;
    }

    let datums = existing.datums?;
    let stored = existing.datum_epoch?;
    let expected = resolve_window(candidate.epoch.as_ref(), epoch_years, stored.end).ok()?;
    if expected != stored {
        debug!(
            "Stored window for {} no longer matches a {}-year window",
            existing.id, epoch_years
        );
        return None;
    }
    Some((datums, stored))
}
