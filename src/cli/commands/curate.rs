//! Curate command: merge one provider batch into the canonical catalog

use crate::app::models::StationCandidate;
use crate::app::services::curation::{CurationPipeline, CurationReport, GazetteerLookup};
use crate::app::services::datum_engine::ConstituentSumPredictor;
use crate::cli::args::{CurateArgs, OutputFormat};
use crate::cli::commands::shared::{load_catalog, load_configuration, read_json, save_catalog};
use crate::config::CatalogConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run the curate command
pub async fn run_curate(args: CurateArgs, cancellation_token: CancellationToken) -> Result<()> {
    args.validate().context("Invalid curate arguments")?;

    let config = build_config(&args)?;
    let mut catalog = load_catalog(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;
    let batch: Vec<StationCandidate> = read_json(&args.batch)
        .with_context(|| format!("Failed to load batch {}", args.batch.display()))?;

    info!(
        "Loaded {} catalog stations and {} candidates",
        catalog.len(),
        batch.len()
    );

    let mut pipeline = CurationPipeline::new(config, Arc::new(ConstituentSumPredictor::new()))
        .with_progress(args.log.show_progress() && args.output_format == OutputFormat::Human)
        .with_cancellation(cancellation_token);

    if args.enrich {
        let gazetteer = GazetteerLookup::from_catalog(&catalog)
            .context("Failed to index catalog places for enrichment")?;
        info!("Enriching from {} catalog places", gazetteer.len());
        pipeline = pipeline.with_place_lookup(Arc::new(gazetteer));
    }

    let report = pipeline
        .run(&mut catalog, batch)
        .await
        .context("Curation run failed")?;

    let output = args.output_path();
    if args.dry_run {
        info!("Dry run: catalog not written");
    } else {
        save_catalog(output, &catalog)
            .with_context(|| format!("Failed to write catalog {}", output.display()))?;
    }

    match args.output_format {
        OutputFormat::Human => {
            if !args.log.quiet {
                print_report(&report, catalog.len(), &output.display().to_string(), args.dry_run);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
        }
    }

    Ok(())
}

/// Configuration file overlaid with command-line overrides
fn build_config(args: &CurateArgs) -> Result<CatalogConfig> {
    let mut config = load_configuration(args.config_file.as_deref())?;

    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(provider) = &args.trusted_provider {
        config = config.with_trusted_provider(provider.clone());
    }
    if args.strict_geolocation {
        config = config.with_strict_geolocation();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn report_json(report: &CurationReport) -> serde_json::Value {
    json!({
        "committed": report.committed_ids,
        "discarded": report.discarded.iter().map(|d| json!({
            "id": d.id,
            "phase": d.phase.to_string(),
            "superseded_by": d.superseded_by,
        })).collect::<Vec<_>>(),
        "phase_counts": {
            "provenance": report.phase_counts.provenance_excluded,
            "canonical_proximity": report.phase_counts.canonical_proximity_excluded,
            "quality_superseded": report.phase_counts.quality_superseded,
            "mutual_duplicates": report.phase_counts.mutual_duplicates_removed,
        },
        "datums_computed": report.datums_computed,
        "datums_reused": report.datums_reused,
        "errors": report.errors.iter().map(|e| json!({
            "station": e.station_id,
            "error": e.error.to_string(),
        })).collect::<Vec<_>>(),
        "stats": {
            "received": report.stats.candidates_received,
            "enriched": report.stats.candidates_enriched,
            "unresolved_subordinates": report.stats.subordinates_unresolved,
            "datum_failures": report.stats.datum_failures,
            "datum_memo_hits": report.stats.datum_memo_hits,
            "processing_time_ms": report.stats.processing_time_ms,
        },
    })
}

fn print_report(report: &CurationReport, catalog_size: usize, output: &str, dry_run: bool) {
    println!();
    println!("{}", "Curation Results".bold().green());
    println!("{}", "═".repeat(50).green());

    println!(
        "  {} {}",
        "Candidates received:".bold(),
        report.stats.candidates_received
    );
    println!(
        "  {} {}",
        "Committed:".bold(),
        report.committed_ids.len().to_string().green()
    );
    println!(
        "  {} {}",
        "Discarded:".bold(),
        report.phase_counts.total().to_string().yellow()
    );
    println!(
        "    provenance {} | canonical proximity {} | quality {} | duplicates {}",
        report.phase_counts.provenance_excluded,
        report.phase_counts.canonical_proximity_excluded,
        report.phase_counts.quality_superseded,
        report.phase_counts.mutual_duplicates_removed
    );
    println!(
        "  {} {} computed, {} reused, {} shared",
        "Datums:".bold(),
        report.datums_computed,
        report.datums_reused,
        report.stats.datum_memo_hits
    );
    if report.stats.candidates_enriched > 0 {
        println!(
            "  {} {}",
            "Enriched:".bold(),
            report.stats.candidates_enriched
        );
    }

    if report.has_errors() {
        println!();
        println!(
            "{} {}",
            "Rejected stations:".bold().red(),
            report.errors.len()
        );
        for error in &report.errors {
            println!("  {} {}", error.station_id.red(), error.error);
        }
    }

    println!();
    if dry_run {
        println!(
            "{} catalog would hold {} stations",
            "Dry run:".bold().yellow(),
            catalog_size
        );
    } else {
        println!(
            "{} {} stations written to {}",
            "Catalog:".bold(),
            catalog_size,
            output.cyan()
        );
    }
    println!(
        "{} {}ms",
        "Elapsed:".bold(),
        report.stats.processing_time_ms
    );
}
