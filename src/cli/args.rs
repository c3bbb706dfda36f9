//! Command-line argument definitions for the tide catalog tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::constants::DEFAULT_MAX_RESULTS;
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the tide station catalog curator
///
/// Merges tide-station records from many providers into one de-duplicated
/// catalog and derives tidal datums for stations that lack them.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tide-catalog",
    version,
    about = "Curate a global catalog of tide-prediction stations",
    long_about = "Merges tide-station records supplied by many providers into one de-duplicated, \
                  internally consistent catalog. Conflicting records are ranked by data quality, \
                  subordinate stations are checked against their reference stations, and tidal \
                  datums (MHHW, MHW, MSL, MTL, MLW, MLLW, LAT) are synthesized from harmonic \
                  constituents."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Deduplicate a candidate batch, derive datums and update the catalog
    Curate(CurateArgs),
    /// Compute synthetic datums for a single reference station
    Datums(DatumsArgs),
    /// List catalog stations near a coordinate
    Near(NearArgs),
}

/// Logging flags shared by every command
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LogArgs {
    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors; also hides progress bars
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl LogArgs {
    /// Get the appropriate log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the curate command
#[derive(Debug, Clone, Parser)]
pub struct CurateArgs {
    /// Canonical catalog (JSON array of stations); a missing file starts an empty catalog
    #[arg(short = 'c', long = "catalog", value_name = "FILE")]
    pub catalog: PathBuf,

    /// Candidate batch from one ingestion run (JSON array of stations)
    #[arg(short = 'b', long = "batch", value_name = "FILE")]
    pub batch: PathBuf,

    /// Where to write the updated catalog; defaults to overwriting --catalog
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Concurrent datum computations (defaults to the number of CPUs)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Provider whose canonical stations suppress nearby candidates
    #[arg(long = "trusted-provider", value_name = "NAME")]
    pub trusted_provider: Option<String>,

    /// Abort the batch on the first candidate with unusable coordinates
    #[arg(long = "strict-geolocation")]
    pub strict_geolocation: bool,

    /// Fill blank country/continent/region from the nearest catalog station
    #[arg(long = "enrich")]
    pub enrich: bool,

    /// Run the whole pipeline but do not write the catalog
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the run report"
    )]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Arguments for the datums command
#[derive(Debug, Clone, Parser)]
pub struct DatumsArgs {
    /// Reference station (JSON object) with harmonic constituents
    #[arg(value_name = "FILE")]
    pub station: PathBuf,

    /// TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Sample spacing in seconds
    #[arg(long = "step", value_name = "SECONDS")]
    pub step_seconds: Option<i64>,

    /// Maximum analysis window in years
    #[arg(long = "years", value_name = "YEARS")]
    pub epoch_years: Option<u32>,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the datums"
    )]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Arguments for the near command
#[derive(Debug, Clone, Parser)]
pub struct NearArgs {
    /// Canonical catalog (JSON array of stations)
    #[arg(short = 'c', long = "catalog", value_name = "FILE")]
    pub catalog: PathBuf,

    /// Latitude in decimal degrees
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: f64,

    /// Only stations within this many kilometres
    #[arg(short = 'r', long = "radius", value_name = "KM")]
    pub radius_km: Option<f64>,

    /// Maximum number of stations to list
    #[arg(short = 'n', long = "limit", default_value_t = DEFAULT_MAX_RESULTS)]
    pub limit: usize,

    /// Only stations from this provider
    #[arg(short = 'p', long = "provider", value_name = "NAME")]
    pub provider: Option<String>,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the station list"
    )]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// The selected subcommand, if any
    pub fn get_command(&self) -> Option<&Commands> {
        self.command.as_ref()
    }
}

impl Commands {
    pub fn log_args(&self) -> &LogArgs {
        match self {
            Self::Curate(args) => &args.log,
            Self::Datums(args) => &args.log,
            Self::Near(args) => &args.log,
        }
    }
}

impl CurateArgs {
    /// Validate the curate command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.batch.exists() {
            return Err(Error::configuration(format!(
                "Batch file does not exist: {}",
                self.batch.display()
            )));
        }

        if let Some(workers) = self.workers {
            if workers == 0 || workers > 256 {
                return Err(Error::configuration(format!(
                    "Workers must be between 1 and 256 (got {workers})"
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Path the updated catalog is written to
    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.catalog)
    }
}

impl DatumsArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.station.exists() {
            return Err(Error::configuration(format!(
                "Station file does not exist: {}",
                self.station.display()
            )));
        }
        if matches!(self.step_seconds, Some(step) if step <= 0) {
            return Err(Error::configuration("--step must be positive"));
        }
        if self.epoch_years == Some(0) {
            return Err(Error::configuration("--years must be at least 1"));
        }
        Ok(())
    }
}

impl NearArgs {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::configuration("--limit must be at least 1"));
        }
        if matches!(self.radius_km, Some(radius) if !radius.is_finite() || radius < 0.0) {
            return Err(Error::configuration(
                "--radius must be a non-negative distance",
            ));
        }
        Ok(())
    }
}
