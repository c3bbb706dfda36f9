use clap::Parser;
use std::process;
use tide_catalog::cli::{args::Args, commands};
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        // Catalog files are only written after a run completes
        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(tide_catalog::Error::processing_interrupted(
                    "Curation interrupted by user",
                ).into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Tide Catalog - Tide Station Curation and Datum Synthesis");
    println!("========================================================");
    println!();
    println!("Merge tide-station records from many providers into one de-duplicated");
    println!("catalog and derive tidal datums from harmonic constituents.");
    println!();
    println!("USAGE:");
    println!("    tide-catalog <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    curate      Deduplicate a candidate batch and update the catalog (main command)");
    println!("    datums      Compute synthetic datums for one reference station");
    println!("    near        List catalog stations near a coordinate");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Merge a TICON batch into the catalog:");
    println!("    tide-catalog curate --catalog stations.json --batch ticon.json");
    println!();
    println!("    # Preview a run with custom thresholds, without writing:");
    println!("    tide-catalog curate -c stations.json -b ticon.json --config tides.toml --dry-run");
    println!();
    println!("    # Datums for one station as JSON:");
    println!("    tide-catalog datums station.json --output-format json");
    println!();
    println!("    # Ten nearest stations to Sydney:");
    println!("    tide-catalog near -c stations.json --lat -33.86 --lon 151.21");
    println!();
    println!("For detailed help on any command, use:");
    println!("    tide-catalog <COMMAND> --help");
}
