//! Shared components for CLI commands
//!
//! Logging setup, configuration loading and JSON file helpers used by every
//! command.

use crate::app::models::CanonicalStation;
use crate::app::services::station_catalog::StationCatalog;
use crate::cli::args::LogArgs;
use crate::config::CatalogConfig;
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Set up structured logging on stderr
pub fn setup_logging(log: &LogArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = log.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tide_catalog={log_level}")));

    let result = if log.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {e}")))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from an optional TOML file
pub fn load_configuration(config_file: Option<&Path>) -> Result<CatalogConfig> {
    match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            CatalogConfig::from_file(path)
        }
        None => {
            info!("No config file given, using defaults");
            Ok(CatalogConfig::default())
        }
    }
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::json(format!("Failed to parse {}", path.display()), e))
}

/// Serialize `value` as pretty JSON, replacing `path` only once the write succeeded
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)
        .map_err(|e| Error::json(format!("Failed to serialize {}", path.display()), e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("Failed to create {}", parent.display()), e))?;
    }

    let staging = path.with_extension("json.partial");
    std::fs::write(&staging, content)
        .map_err(|e| Error::io(format!("Failed to write {}", staging.display()), e))?;
    std::fs::rename(&staging, path)
        .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Load a catalog file; a missing file is an empty catalog
pub fn load_catalog(path: &Path) -> Result<StationCatalog> {
    if !path.exists() {
        info!("Catalog {} does not exist yet, starting empty", path.display());
        return Ok(StationCatalog::new());
    }
    let stations: Vec<CanonicalStation> = read_json(path)?;
    StationCatalog::from_stations(stations)
}

/// Persist a catalog as a JSON array in id order
pub fn save_catalog(path: &Path, catalog: &StationCatalog) -> Result<()> {
    let stations: Vec<&CanonicalStation> = catalog.stations().collect();
    write_json(path, &stations)
}
