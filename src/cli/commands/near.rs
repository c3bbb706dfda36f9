//! Near command: list catalog stations around a coordinate

use crate::app::models::{CanonicalStation, GeoPoint, provider_slug};
use crate::app::services::spatial_index::NearQuery;
use crate::cli::args::{NearArgs, OutputFormat};
use crate::cli::commands::shared::load_catalog;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

/// Run the near command
pub fn run_near(args: NearArgs) -> Result<()> {
    args.validate().context("Invalid near arguments")?;

    let catalog = load_catalog(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;
    let index = catalog
        .spatial_index()
        .context("Failed to index catalog stations")?;

    let point = GeoPoint::new(args.latitude, args.longitude);
    let query = NearQuery::within(args.radius_km.unwrap_or(f64::INFINITY))
        .with_max_results(args.limit);

    let hits = match &args.provider {
        Some(provider) => {
            let wanted = provider_slug(provider);
            index.near_matching(point, query, |station| {
                provider_slug(station.provider()) == wanted
            })
        }
        None => index.near(point, query),
    }
    .context("Proximity query failed")?;

    match args.output_format {
        OutputFormat::Human => print_hits(&hits),
        OutputFormat::Json => {
            let rows: Vec<_> = hits
                .iter()
                .map(|(station, distance_km)| {
                    json!({
                        "id": station.id,
                        "name": station.station.name,
                        "distance_km": distance_km,
                        "type": station.station.station_type,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

fn print_hits(hits: &[(&CanonicalStation, f64)]) {
    if hits.is_empty() {
        println!("{}", "No stations found".yellow());
        return;
    }

    println!(
        "{:<32} {:<30} {:>10}",
        "ID".bold(),
        "Name".bold(),
        "Dist (km)".bold()
    );
    for (station, distance_km) in hits {
        let kind = if station.is_reference() { "R" } else { "S" };
        println!(
            "{:<32} {:<30} {:>10.3} {}",
            station.id.cyan(),
            station.station.name,
            distance_km,
            kind.dimmed()
        );
    }
}
