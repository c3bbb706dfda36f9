//! Subordinate-to-reference resolution for surviving candidates

use crate::Error;
use crate::app::models::StationCandidate;
use crate::app::services::station_catalog::StationCatalog;
use crate::app::services::station_dedup::CandidateError;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Reference stations that will exist once a batch is committed
pub(crate) struct ReferenceSet<'a> {
    catalog: &'a StationCatalog,
    /// Batch survivors by id, flagged when they are reference stations
    survivors: HashMap<String, bool>,
    /// Catalog ids that the commit will delete
    removed: HashSet<String>,
}

impl<'a> ReferenceSet<'a> {
    pub fn new(
        catalog: &'a StationCatalog,
        survivors: &[StationCandidate],
        removed: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            catalog,
            survivors: survivors
                .iter()
                .map(|candidate| (candidate.id(), candidate.is_reference()))
                .collect(),
            removed: removed.into_iter().collect(),
        }
    }

    /// Stop treating `id` as available, e.g. after its datums failed
    pub fn withdraw(&mut self, id: &str) {
        self.survivors.remove(id);
        self.removed.insert(id.to_string());
    }

    /// Survivors shadow catalog entries with the same id
    pub fn is_reference(&self, id: &str) -> bool {
        if let Some(&is_reference) = self.survivors.get(id) {
            return is_reference;
        }
        !self.removed.contains(id) && self.catalog.get(id).is_some_and(|s| s.is_reference())
    }
}

/// Split survivors into resolvable stations and subordinates with a missing reference
pub(crate) fn resolve_subordinates(
    survivors: Vec<StationCandidate>,
    references: &ReferenceSet<'_>,
) -> (Vec<StationCandidate>, Vec<CandidateError>) {
    let mut resolved = Vec::with_capacity(survivors.len());
    let mut errors = Vec::new();

    for candidate in survivors {
        if candidate.is_reference() {
            resolved.push(candidate);
            continue;
        }

        let id = candidate.id();
        match candidate.reference_id() {
            Some(reference_id) if references.is_reference(reference_id) => resolved.push(candidate),
            Some(reference_id) => {
                warn!("Excluding {}: reference {} is not available", id, reference_id);
                let error = Error::unresolved_reference(&id, reference_id);
                errors.push(CandidateError::new(id, error));
            }
            None => {
                warn!("Excluding {}: subordinate without offsets", id);
                let error = Error::data_validation(format!(
                    "subordinate station '{id}' has no reference station"
                ));
                errors.push(CandidateError::new(id, error));
            }
        }
    }

    (resolved, errors)
}
