//! Datums command: synthesize tidal datums for one reference station

use crate::app::models::StationCandidate;
use crate::app::services::datum_engine::{
    ConstituentSumPredictor, DatumOptions, DatumsResult, compute_datums,
};
use crate::cli::args::{DatumsArgs, OutputFormat};
use crate::cli::commands::shared::{load_configuration, read_json};
use anyhow::{Context, Result};
use colored::Colorize;
use tokio::task;
use tracing::info;

/// Run the datums command
pub async fn run_datums(args: DatumsArgs) -> Result<()> {
    args.validate().context("Invalid datums arguments")?;

    let config = load_configuration(args.config_file.as_deref())?;
    let mut options = DatumOptions::from(&config.datums);
    if let Some(step) = args.step_seconds {
        options.step_seconds = step;
    }
    if let Some(years) = args.epoch_years {
        options.epoch_years = years;
    }

    let station: StationCandidate = read_json(&args.station)
        .with_context(|| format!("Failed to load station {}", args.station.display()))?;
    if !station.is_reference() {
        anyhow::bail!(
            "{} is a subordinate station; datums are only derived for reference stations",
            station.id()
        );
    }

    info!(
        "Synthesizing datums for {} from {} constituents",
        station.id(),
        station.harmonic_constituents.len()
    );

    let id = station.id();
    let result = task::spawn_blocking(move || {
        compute_datums(
            &ConstituentSumPredictor::new(),
            &station.harmonic_constituents,
            station.epoch.as_ref(),
            &options,
        )
    })
    .await
    .context("Datum worker panicked")?
    .with_context(|| format!("Failed to compute datums for {id}"))?;

    match args.output_format {
        OutputFormat::Human => print_datums(&id, &result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

fn print_datums(id: &str, result: &DatumsResult) {
    println!();
    println!("{} {}", "Tidal datums for".bold().green(), id.bold());
    println!("{}", "═".repeat(50).green());
    println!(
        "  {} {} to {} ({:.2} years)",
        "Window:".bold(),
        result.resolved_start.format("%Y-%m-%d"),
        result.resolved_end.format("%Y-%m-%d"),
        result.length_years
    );
    println!(
        "  {} {}s steps, {:.4}h tidal day",
        "Sampling:".bold(),
        result.step_seconds,
        result.tidal_day_hours
    );
    println!();
    for (name, value) in result.datums.entries() {
        println!("  {:<6} {:>9.3}", name.cyan(), value);
    }
}
