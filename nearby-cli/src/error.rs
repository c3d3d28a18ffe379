//! Error types emitted by the NearBy CLI.
//!
//! A search that ends in a `Failed` state is a report, not an error. Only
//! configuration, I/O, and setup failures surface here.

use std::sync::Arc;

use camino::Utf8PathBuf;
use nearby_core::{CatalogError, CoordinateError, LocationError, RegionError};
use nearby_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the NearBy CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A `lat,lon` option did not describe a valid coordinate.
    #[error("invalid {field} {value:?}: {source}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        #[source]
        source: CoordinateError,
    },
    /// The search region around `--near` could not be built.
    #[error("invalid search region: {0}")]
    InvalidRegion(#[source] RegionError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Constructing an HTTP provider failed.
    #[error("failed to build {provider} for {base_url:?}: {source}")]
    BuildProvider {
        provider: &'static str,
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The fixed origin could not be delivered as a location update.
    #[error("failed to start location updates: {0}")]
    Location(#[from] LocationError),
    /// Reading the place catalog failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
