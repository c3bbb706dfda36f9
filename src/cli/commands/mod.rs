//! Command implementations for the tide catalog CLI
//!
//! Each command lives in its own module:
//! - `curate`: deduplicate a candidate batch and commit it to the catalog
//! - `datums`: synthesize datums for one reference station
//! - `near`: proximity lookup against the catalog

pub mod curate;
pub mod datums;
pub mod near;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Dispatch to the selected subcommand
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<()> {
    let Some(command) = args.command else {
        anyhow::bail!("No command given; run with --help to list commands");
    };

    shared::setup_logging(command.log_args())?;

    match command {
        Commands::Curate(curate_args) => curate::run_curate(curate_args, cancellation_token).await,
        Commands::Datums(datums_args) => datums::run_datums(datums_args).await,
        Commands::Near(near_args) => near::run_near(near_args),
    }
}
