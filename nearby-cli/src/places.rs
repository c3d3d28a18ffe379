//! Places command implementation for the NearBy CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use nearby_core::{BoundingRegion, Place, PlaceCatalog, PlaceIndex};
use nearby_data::JsonPlaceCatalog;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_PLACES_CATALOG, ARG_PLACES_NEAR, ARG_PLACES_SPAN_DEG, CliError, ENV_PLACES_CATALOG,
    parse_coordinate, write_json,
};

/// Side of the square region around `--near`, in degrees.
pub(crate) const DEFAULT_SPAN_DEG: f64 = 0.1;

/// CLI arguments for the `places` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the places in a JSON catalog file. With --near, only \
                 the places inside a square region around that point are \
                 printed, in catalog order.",
    about = "List places from a catalog"
)]
#[ortho_config(prefix = "NEARBY")]
pub(crate) struct PlacesArgs {
    /// Path to the JSON place catalog.
    #[arg(long = ARG_PLACES_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Only list places around this `lat,lon`.
    #[arg(long = ARG_PLACES_NEAR, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) near: Option<String>,
    /// Region size around `--near`, in degrees.
    #[arg(long = ARG_PLACES_SPAN_DEG, value_name = "degrees")]
    #[serde(default)]
    pub(crate) span_deg: Option<f64>,
}

impl PlacesArgs {
    pub(crate) fn into_config(self) -> Result<PlacesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlacesConfig::try_from(merged)
    }
}

/// Resolved `places` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacesConfig {
    pub(crate) catalog: Utf8PathBuf,
    /// Visible region; `None` lists the whole catalog.
    pub(crate) region: Option<BoundingRegion>,
}

impl PlacesConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.catalog, ARG_PLACES_CATALOG)
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match nearby_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<PlacesArgs> for PlacesConfig {
    type Error = CliError;

    fn try_from(args: PlacesArgs) -> Result<Self, Self::Error> {
        let catalog = args.catalog.ok_or(CliError::MissingArgument {
            field: ARG_PLACES_CATALOG,
            env: ENV_PLACES_CATALOG,
        })?;
        let span = args.span_deg.unwrap_or(DEFAULT_SPAN_DEG);
        let region = args
            .near
            .map(|raw| {
                let center = parse_coordinate(ARG_PLACES_NEAR, &raw)?;
                BoundingRegion::around(center, span, span).map_err(CliError::InvalidRegion)
            })
            .transpose()?;
        Ok(Self { catalog, region })
    }
}

pub(crate) fn run_places(args: PlacesArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_places_with(args, &mut stdout)
}

pub(crate) fn run_places_with(args: PlacesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let places = visible_places(&JsonPlaceCatalog::new(config.catalog.clone()), config.region)?;
    write_json(writer, &places)
}

/// The catalog, or the part of it inside `region`.
pub(crate) fn visible_places(
    catalog: &dyn PlaceCatalog,
    region: Option<BoundingRegion>,
) -> Result<Vec<Place>, CliError> {
    let places = catalog.fetch_nearby_places()?;
    Ok(match region {
        Some(region) => PlaceIndex::new(places).places_in_region(&region),
        None => places,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlacesConfig, CliError> {
    let merged = PlacesArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlacesConfig::try_from(merged)
}
