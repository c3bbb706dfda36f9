//! Cross-reference checks for the canonical set
//!
//! A subordinate that silently loses its reference station would corrupt the
//! exported catalog, so these checks fail hard.

use super::StationCatalog;
use crate::app::models::{CanonicalStation, StationType};
use crate::{Error, Result};

impl StationCatalog {
    /// Look up the reference station a subordinate points at
    pub fn resolve_reference(&self, station: &CanonicalStation) -> Result<&CanonicalStation> {
        let reference_id = station.station.reference_id().ok_or_else(|| {
            Error::data_validation(format!(
                "station '{}' has no reference station",
                station.id
            ))
        })?;

        match self.get(reference_id) {
            Some(reference) if reference.station.station_type == StationType::Reference => {
                Ok(reference)
            }
            _ => Err(Error::unresolved_reference(&station.id, reference_id)),
        }
    }

    /// Every subordinate must resolve to a reference-type station in this catalog
    pub fn validate_references(&self) -> Result<()> {
        for station in self.stations() {
            if station.station.station_type == StationType::Subordinate {
                self.resolve_reference(station)?;
            }
        }
        Ok(())
    }

    /// Subordinate stations that point at `reference_id`
    pub fn subordinates_of(&self, reference_id: &str) -> Vec<&CanonicalStation> {
        self.stations()
            .filter(|station| station.station.reference_id() == Some(reference_id))
            .collect()
    }
}
