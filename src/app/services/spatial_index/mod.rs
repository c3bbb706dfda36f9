//! Spatial index service for great-circle proximity queries
//!
//! The index is an immutable R-tree over station positions projected onto the
//! unit sphere. Chord length on the sphere is monotone in great-circle
//! distance, so the tree prunes candidates correctly near the poles and across
//! the antimeridian, while the reported distances come from the haversine
//! formula.
//!
//! The index is built once per point set and never mutated; callers rebuild it
//! whenever the set changes (for example between deduplication phases).

use crate::app::models::GeoPoint;
use crate::constants::DEFAULT_MAX_RESULTS;
use crate::Result;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use std::cmp::Ordering;

pub mod geodesy;

#[cfg(test)]
pub mod tests;

pub use geodesy::haversine_km;

/// An indexed position remembering its insertion order
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    xyz: [f64; 3],
    index: usize,
    point: GeoPoint,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.xyz[0] - point[0];
        let dy = self.xyz[1] - point[1];
        let dz = self.xyz[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// A query hit: insertion index of the point, the point, and its distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub point: GeoPoint,
    pub distance_km: f64,
}

/// Limits for a proximity query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearQuery {
    pub max_results: usize,
    pub max_distance_km: f64,
}

impl Default for NearQuery {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            max_distance_km: f64::INFINITY,
        }
    }
}

impl NearQuery {
    pub fn within(max_distance_km: f64) -> Self {
        Self {
            max_distance_km,
            ..Self::default()
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Immutable nearest-neighbour index over geographic points
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Build an index over `points`; results refer back to positions in this slice
    pub fn build(points: &[GeoPoint]) -> Result<Self> {
        let mut entries = Vec::with_capacity(points.len());
        for (index, point) in points.iter().enumerate() {
            point.validate()?;
            entries.push(IndexedPoint {
                xyz: geodesy::unit_vector(*point),
                index,
                point: *point,
            });
        }

        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Up to `query.max_results` points within `query.max_distance_km`, nearest first
    pub fn near(&self, point: GeoPoint, query: NearQuery) -> Result<Vec<Neighbor>> {
        self.near_filtered(point, query, |_| true)
    }

    /// Like [`SpatialIndex::near`], keeping only points whose insertion index passes `predicate`
    ///
    /// Ties in distance are broken by insertion order.
    pub fn near_filtered<F>(
        &self,
        point: GeoPoint,
        query: NearQuery,
        predicate: F,
    ) -> Result<Vec<Neighbor>>
    where
        F: Fn(usize) -> bool,
    {
        point.validate()?;

        if query.max_results == 0 || self.is_empty() || query.max_distance_km < 0.0 {
            return Ok(Vec::new());
        }

        let origin = geodesy::unit_vector(point);
        let mut hits: Vec<Neighbor> = if query.max_distance_km.is_finite() {
            let radius_2 = geodesy::chord_2_for_distance_km(query.max_distance_km);
            self.tree
                .locate_within_distance(origin, radius_2)
                .filter(|entry| predicate(entry.index))
                .map(|entry| to_neighbor(point, entry))
                .filter(|hit| hit.distance_km <= query.max_distance_km)
                .collect()
        } else {
            self.collect_nearest_unbounded(point, origin, query.max_results, &predicate)
        };

        hits.sort_by(compare_neighbors);
        hits.truncate(query.max_results);
        Ok(hits)
    }

    /// Closest point within `max_distance_km`, if any
    pub fn nearest(&self, point: GeoPoint, max_distance_km: f64) -> Result<Option<Neighbor>> {
        self.nearest_filtered(point, max_distance_km, |_| true)
    }

    pub fn nearest_filtered<F>(
        &self,
        point: GeoPoint,
        max_distance_km: f64,
        predicate: F,
    ) -> Result<Option<Neighbor>>
    where
        F: Fn(usize) -> bool,
    {
        let query = NearQuery::within(max_distance_km).with_max_results(1);
        Ok(self
            .near_filtered(point, query, predicate)?
            .into_iter()
            .next())
    }

    /// Walk the tree outward until `max_results` hits are found, keeping trailing ties
    fn collect_nearest_unbounded<F>(
        &self,
        point: GeoPoint,
        origin: [f64; 3],
        max_results: usize,
        predicate: &F,
    ) -> Vec<Neighbor>
    where
        F: Fn(usize) -> bool,
    {
        let mut hits = Vec::new();
        let mut last_distance_2 = 0.0;

        for (entry, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&origin) {
            if !predicate(entry.index) {
                continue;
            }
            if hits.len() >= max_results && distance_2 > last_distance_2 * (1.0 + 1e-9) + 1e-18
            {
                break;
            }
            last_distance_2 = distance_2;
            hits.push(to_neighbor(point, entry));
        }

        hits
    }
}

fn to_neighbor(origin: GeoPoint, entry: &IndexedPoint) -> Neighbor {
    Neighbor {
        index: entry.index,
        point: entry.point,
        distance_km: haversine_km(origin, entry.point),
    }
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.index.cmp(&b.index))
}
