//! Command-line interface for the NearBy engine.
//!
//! `nearby search` runs one destination search against HTTP providers from a
//! fixed origin; `nearby places` lists the place catalog, optionally limited
//! to a region. Both print JSON on stdout and log to stderr.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use nearby_core::Coordinate;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod error;
mod places;
mod search;

pub use error::CliError;

use places::PlacesArgs;
use search::SearchArgs;

const ARG_SEARCH_QUERY: &str = "query";
const ARG_SEARCH_FROM: &str = "from";
const ARG_SEARCH_GEOCODER_BASE_URL: &str = "geocoder-base-url";
const ARG_SEARCH_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_SEARCH_TIMEOUT_SECS: &str = "timeout-secs";
const ENV_SEARCH_QUERY: &str = "NEARBY_CMDS_SEARCH_QUERY";
const ENV_SEARCH_FROM: &str = "NEARBY_CMDS_SEARCH_FROM";

const ARG_PLACES_CATALOG: &str = "catalog";
const ARG_PLACES_NEAR: &str = "near";
const ARG_PLACES_SPAN_DEG: &str = "span-deg";
const ENV_PLACES_CATALOG: &str = "NEARBY_CMDS_PLACES_CATALOG";

/// Environment variable holding the log filter directive.
pub const ENV_LOG: &str = "NEARBY_LOG";

/// Run the NearBy CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, or
/// when reading inputs or writing output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging();
    match cli.command {
        Command::Search(args) => search::run_search(args),
        Command::Places(args) => places::run_places(args),
    }
}

/// Route `log` and `tracing` output to stderr, filtered by [`ENV_LOG`].
fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        log::debug!("a global logger is already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "nearby",
    about = "Search destinations and list nearby places",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find a destination and a driving route to it.
    Search(SearchArgs),
    /// List places from a catalog file.
    Places(PlacesArgs),
}

/// Parse a `lat,lon` option value.
fn parse_coordinate(field: &'static str, raw: &str) -> Result<Coordinate, CliError> {
    raw.parse().map_err(|source| CliError::InvalidCoordinate {
        field,
        value: raw.to_owned(),
        source,
    })
}

fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
