//! Tests for the individual deduplication phases

use super::*;
use crate::app::services::station_dedup::DedupPhase;
use crate::test_support::{
    catalog_of, reference_candidate, with_disclaimer, with_epoch,
};

#[test]
fn test_provenance_excludes_republished_primary_data() {
    let catalog = catalog_of(vec![reference_candidate("NOAA", "9999999", 20.0, -150.0)]);
    let batch = vec![
        reference_candidate("TICON", "portland-071a-usa-noaa", 43.66, -70.25),
        reference_candidate("TICON", "brest-822a-fra-uhslc", 48.38, -4.49),
    ];

    let outcome = run_default(&catalog, &batch);
    assert_eq!(outcome.phase_counts.provenance_excluded, 1);
    assert_eq!(outcome.discarded[0].id, "ticon/portland-071a-usa-noaa");
    assert_eq!(outcome.discarded[0].phase, DedupPhase::Provenance);
    assert_eq!(surviving_ids(&outcome), vec!["ticon/brest-822a-fra-uhslc"]);
}

#[test]
fn test_provenance_keeps_aggregator_copy_without_primary() {
    let catalog = catalog_of(vec![reference_candidate("BODC", "x", 50.0, 0.0)]);
    let batch = vec![reference_candidate("TICON", "portland-071a-usa-noaa", 43.66, -70.25)];

    let outcome = run_default(&catalog, &batch);
    assert_eq!(outcome.phase_counts.provenance_excluded, 0);
    assert_eq!(outcome.surviving.len(), 1);
}

#[test]
fn test_trusted_canonical_station_excludes_nearby_candidate() {
    let catalog = catalog_of(vec![reference_candidate("NOAA", "8410140", 44.0, -67.0)]);

    // 80 m north, and ranked as well as a candidate can be
    let best_possible = with_epoch(
        reference_candidate("TICON", "eastport-uhslc", 44.0 + metres_north(80.0), -67.0),
        1900,
        2020,
    );
    let outcome = run_default(&catalog, &[best_possible]);

    assert_eq!(outcome.phase_counts.canonical_proximity_excluded, 1);
    assert_eq!(outcome.discarded[0].superseded_by.as_deref(), Some("noaa/8410140"));
    assert!(outcome.surviving.is_empty());
}

#[test]
fn test_trusted_exclusion_respects_threshold_and_provider() {
    let catalog = catalog_of(vec![
        reference_candidate("NOAA", "8410140", 44.0, -67.0),
        reference_candidate("BODC", "other", 50.0, 0.0),
    ]);

    let far = reference_candidate("TICON", "far-uhslc", 44.0 + metres_north(150.0), -67.0);
    let next_to_untrusted =
        reference_candidate("TICON", "near-bodc", 50.0 + metres_north(20.0), 0.0);

    let outcome = run_default(&catalog, &[far, next_to_untrusted]);
    assert_eq!(outcome.phase_counts.canonical_proximity_excluded, 0);
    assert_eq!(outcome.surviving.len(), 2);
}

#[test]
fn test_reingested_trusted_station_not_superseded_by_itself() {
    let catalog = catalog_of(vec![reference_candidate("NOAA", "8410140", 44.0, -67.0)]);
    let batch = vec![reference_candidate("NOAA", "8410140", 44.0, -67.0)];

    let outcome = run_default(&catalog, &batch);
    assert_eq!(outcome.phase_counts.canonical_proximity_excluded, 0);
    assert_eq!(surviving_ids(&outcome), vec!["noaa/8410140"]);
}

#[test]
fn test_flagged_candidate_superseded_by_clean_neighbour() {
    let catalog = StationCatalog::new();
    let flagged = with_disclaimer(
        with_epoch(reference_candidate("TICON", "flagged-gloss", 10.0, 10.0), 1950, 2020),
        "These data have not been quality controlled.",
    );
    // 80 m away: outside the mutual-duplicate radius, inside the quality radius
    let clean = reference_candidate("TICON", "clean-ioc", 10.0 + metres_north(80.0), 10.0);

    let outcome = run_default(&catalog, &[flagged, clean]);
    assert_eq!(outcome.phase_counts.quality_superseded, 1);
    assert_eq!(outcome.discarded[0].id, "ticon/flagged-gloss");
    assert_eq!(
        outcome.discarded[0].superseded_by.as_deref(),
        Some("ticon/clean-ioc")
    );
    assert_eq!(surviving_ids(&outcome), vec!["ticon/clean-ioc"]);
}

#[test]
fn test_two_flagged_candidates_do_not_supersede_each_other() {
    let catalog = StationCatalog::new();
    let a = with_disclaimer(
        reference_candidate("TICON", "a-gloss", 10.0, 10.0),
        "quality control pending",
    );
    let b = with_disclaimer(
        reference_candidate("TICON", "b-gloss", 10.0 + metres_north(80.0), 10.0),
        "QC not applied",
    );

    let outcome = run_default(&catalog, &[a, b]);
    assert_eq!(outcome.phase_counts.quality_superseded, 0);
    assert_eq!(outcome.surviving.len(), 2);
}

#[test]
fn test_isolated_flagged_candidate_survives() {
    let catalog = StationCatalog::new();
    let flagged = with_disclaimer(
        reference_candidate("TICON", "lonely-gloss", -33.0, 151.0),
        "Not quality-controlled",
    );
    let far_clean = reference_candidate("TICON", "far-bom", -33.0 + metres_north(500.0), 151.0);

    let outcome = run_default(&catalog, &[flagged, far_clean]);
    assert_eq!(outcome.surviving.len(), 2);
}

#[test]
fn test_mutual_duplicates_keep_best_of_group() {
    let catalog = StationCatalog::new();
    let batch = vec![
        reference_candidate("TICON", "site-psmsl", 0.0, 0.0),
        reference_candidate("TICON", "site-uhslc", metres_north(20.0), 0.0),
        reference_candidate("TICON", "site-bodc", metres_north(-20.0), 0.0),
    ];

    let outcome = run_default(&catalog, &batch);
    assert_eq!(outcome.phase_counts.mutual_duplicates_removed, 2);
    assert_eq!(surviving_ids(&outcome), vec!["ticon/site-uhslc"]);
    assert!(
        outcome
            .discarded
            .iter()
            .all(|d| d.superseded_by.as_deref() == Some("ticon/site-uhslc"))
    );
}

#[test]
fn test_mutual_grouping_is_single_hop() {
    let catalog = StationCatalog::new();
    // A - B - C spaced 40 m apart; A and C are 80 m apart
    let a = with_epoch(reference_candidate("TICON", "a-bodc", 0.0, 0.0), 2000, 2010);
    let b = with_epoch(reference_candidate("TICON", "b-bodc", metres_north(40.0), 0.0), 1980, 2010);
    let c = with_epoch(reference_candidate("TICON", "c-bodc", metres_north(80.0), 0.0), 2005, 2010);

    let outcome = run_default(&catalog, &[a, b, c]);

    // The group around A is {A, B}; B wins. C is never grouped with B because
    // B was finalized with A's group.
    assert_eq!(outcome.phase_counts.mutual_duplicates_removed, 1);
    assert_eq!(surviving_ids(&outcome), vec!["ticon/b-bodc", "ticon/c-bodc"]);
}

#[test]
fn test_grouping_depends_on_batch_order() {
    let catalog = StationCatalog::new();
    let a = reference_candidate("TICON", "a-bodc", 0.0, 0.0);
    let b = reference_candidate("TICON", "b-bodc", metres_north(40.0), 0.0);
    let c = reference_candidate("TICON", "c-bodc", metres_north(80.0), 0.0);

    // Visiting B first pulls both A and C into its group
    let outcome = run_default(&catalog, &[b, a, c]);
    assert_eq!(outcome.phase_counts.mutual_duplicates_removed, 2);
    assert_eq!(surviving_ids(&outcome), vec!["ticon/a-bodc"]);
}
