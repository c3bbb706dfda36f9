//! End-to-end curation of provider batches into the canonical catalog
//!
//! A run enriches missing place metadata, deduplicates the batch against the
//! catalog, drops subordinates whose reference station will not exist,
//! derives datums for surviving reference stations in parallel, and commits
//! the result only if every subordinate in the updated catalog still resolves.

pub mod enrichment;
pub mod report;
pub mod resolution;
pub mod runner;

#[cfg(test)]
pub mod tests;

pub use enrichment::{GazetteerLookup, PlaceInfo, PlaceLookup, enrich_candidates};
pub use report::{CurationReport, CurationStats};
pub use runner::CurationPipeline;
