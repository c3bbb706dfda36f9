//! Place metadata enrichment
//!
//! Providers often leave country, continent or region blank. A
//! [`PlaceLookup`] maps coordinates to the nearest known place so those
//! fields can be filled in before deduplication. Fields a provider did set
//! are never overwritten.

use crate::Result;
use crate::app::models::{GeoPoint, StationCandidate};
use crate::app::services::spatial_index::SpatialIndex;
use crate::app::services::station_catalog::StationCatalog;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Administrative names for a location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl PlaceInfo {
    pub fn is_empty(&self) -> bool {
        [&self.country, &self.continent, &self.region]
            .iter()
            .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

/// Reverse geocoder used to fill missing place fields
pub trait PlaceLookup: Send + Sync {
    /// Nearest known place within `max_distance_km`; `None` when nothing is close enough
    fn nearest_place(&self, latitude: f64, longitude: f64, max_distance_km: f64)
    -> Option<PlaceInfo>;
}

/// Fill empty place fields from `lookup`, returning how many candidates changed
pub fn enrich_candidates(
    batch: &mut [StationCandidate],
    lookup: &dyn PlaceLookup,
    max_distance_km: f64,
) -> usize {
    let mut enriched = 0;

    for candidate in batch.iter_mut() {
        if !needs_enrichment(candidate) {
            continue;
        }
        // Bad coordinates are reported by deduplication
        let Ok(location) = candidate.location() else {
            continue;
        };
        let Some(place) = lookup.nearest_place(location.latitude, location.longitude, max_distance_km)
        else {
            continue;
        };

        if apply_place(candidate, &place) {
            debug!("Enriched {} with place metadata", candidate.id());
            enriched += 1;
        }
    }

    enriched
}

fn needs_enrichment(candidate: &StationCandidate) -> bool {
    candidate.country.trim().is_empty()
        || candidate.continent.trim().is_empty()
        || candidate.region.as_deref().is_none_or(|r| r.trim().is_empty())
}

fn usable(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Copy place fields into blank candidate fields
fn apply_place(candidate: &mut StationCandidate, place: &PlaceInfo) -> bool {
    let mut changed = false;

    if candidate.country.trim().is_empty() {
        if let Some(country) = usable(&place.country) {
            candidate.country = country.to_string();
            changed = true;
        }
    }
    if candidate.continent.trim().is_empty() {
        if let Some(continent) = usable(&place.continent) {
            candidate.continent = continent.to_string();
            changed = true;
        }
    }
    if candidate.region.as_deref().is_none_or(|r| r.trim().is_empty()) {
        if let Some(region) = usable(&place.region) {
            candidate.region = Some(region.to_string());
            changed = true;
        }
    }

    changed
}

/// Place lookup over a fixed set of located places
#[derive(Debug)]
pub struct GazetteerLookup {
    index: SpatialIndex,
    places: Vec<PlaceInfo>,
}

impl GazetteerLookup {
    pub fn new(entries: Vec<(GeoPoint, PlaceInfo)>) -> Result<Self> {
        let (points, places): (Vec<GeoPoint>, Vec<PlaceInfo>) = entries
            .into_iter()
            .filter(|(_, place)| !place.is_empty())
            .unzip();
        Ok(Self {
            index: SpatialIndex::build(&points)?,
            places,
        })
    }

    /// Use the place fields already recorded on canonical stations
    pub fn from_catalog(catalog: &StationCatalog) -> Result<Self> {
        let entries = catalog
            .stations()
            .filter_map(|station| {
                let location = station.station.location().ok()?;
                let place = PlaceInfo {
                    country: Some(station.station.country.clone()),
                    continent: Some(station.station.continent.clone()),
                    region: station.station.region.clone(),
                };
                Some((location, place))
            })
            .collect();
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl PlaceLookup for GazetteerLookup {
    fn nearest_place(
        &self,
        latitude: f64,
        longitude: f64,
        max_distance_km: f64,
    ) -> Option<PlaceInfo> {
        let point = GeoPoint::new(latitude, longitude);
        match self.index.nearest(point, max_distance_km) {
            Ok(hit) => hit.map(|neighbor| self.places[neighbor.index].clone()),
            Err(e) => {
                debug!("Place lookup failed for ({latitude}, {longitude}): {e}");
                None
            }
        }
    }
}
