//! Station catalog service holding the canonical station set
//!
//! The catalog keys every committed station by its stable id and keeps the
//! set ordered, so iteration (and every index built from it) is deterministic
//! across runs.

use crate::app::models::{CanonicalStation, GeoPoint, provider_slug};
use crate::app::services::spatial_index::{NearQuery, SpatialIndex};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

pub mod integrity;

#[cfg(test)]
pub mod tests;

/// Canonical station set keyed by station id
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    pub(crate) stations: BTreeMap<String, CanonicalStation>,
}

impl StationCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from persisted stations, rejecting duplicate ids
    pub fn from_stations(stations: impl IntoIterator<Item = CanonicalStation>) -> Result<Self> {
        let mut catalog = Self::new();
        for station in stations {
            if catalog.contains(&station.id) {
                return Err(Error::data_validation(format!(
                    "duplicate canonical station id '{}'",
                    station.id
                )));
            }
            catalog.insert(station)?;
        }
        debug!("Loaded catalog with {} stations", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalStation> {
        self.stations.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations in id order
    pub fn stations(&self) -> impl Iterator<Item = &CanonicalStation> {
        self.stations.values()
    }

    pub fn station_ids(&self) -> Vec<&str> {
        self.stations.keys().map(String::as_str).collect()
    }

    /// Insert or replace a station, returning the record it replaced
    pub fn insert(&mut self, station: CanonicalStation) -> Result<Option<CanonicalStation>> {
        station.station.location()?;

        let derived_id = station.station.id();
        if station.id != derived_id {
            return Err(Error::data_validation(format!(
                "station id '{}' does not match its source (expected '{}')",
                station.id, derived_id
            )));
        }

        Ok(self.stations.insert(station.id.clone(), station))
    }

    pub fn remove(&mut self, id: &str) -> Option<CanonicalStation> {
        self.stations.remove(id)
    }

    /// True when any station was supplied by `provider` (case-insensitive)
    pub fn has_provider(&self, provider: &str) -> bool {
        let wanted = provider_slug(provider);
        self.stations
            .values()
            .any(|station| provider_slug(station.provider()) == wanted)
    }

    pub fn stations_by_provider(&self, provider: &str) -> Vec<&CanonicalStation> {
        let wanted = provider_slug(provider);
        self.stations
            .values()
            .filter(|station| provider_slug(station.provider()) == wanted)
            .collect()
    }

    /// Build a proximity index over every station in id order
    pub fn spatial_index(&self) -> Result<CatalogIndex<'_>> {
        let stations: Vec<&CanonicalStation> = self.stations.values().collect();
        let points = stations
            .iter()
            .map(|station| station.station.location())
            .collect::<Result<Vec<GeoPoint>>>()?;

        Ok(CatalogIndex {
            index: SpatialIndex::build(&points)?,
            stations,
        })
    }

    pub fn into_stations(self) -> Vec<CanonicalStation> {
        self.stations.into_values().collect()
    }
}

/// Spatial index bound to the catalog stations it was built from
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    index: SpatialIndex,
    stations: Vec<&'a CanonicalStation>,
}

impl<'a> CatalogIndex<'a> {
    /// Stations near `point`, nearest first, with distances in kilometres
    pub fn near(
        &self,
        point: GeoPoint,
        query: NearQuery,
    ) -> Result<Vec<(&'a CanonicalStation, f64)>> {
        self.near_matching(point, query, |_| true)
    }

    /// Stations near `point` for which `predicate` holds
    pub fn near_matching<F>(
        &self,
        point: GeoPoint,
        query: NearQuery,
        predicate: F,
    ) -> Result<Vec<(&'a CanonicalStation, f64)>>
    where
        F: Fn(&CanonicalStation) -> bool,
    {
        let hits = self
            .index
            .near_filtered(point, query, |i| predicate(self.stations[i]))?;
        Ok(hits
            .into_iter()
            .map(|hit| (self.stations[hit.index], hit.distance_km))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
