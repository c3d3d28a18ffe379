//! Search command implementation for the NearBy CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use futures::StreamExt;
use nearby_core::{
    Coordinate, GeocodeResolver, LocationSource, LocationStream, PermissionState, Position,
    PositionFeed, RouteCalculator, SearchOrchestrator, SearchState, SubmitOutcome,
    ViewportState,
};
use nearby_data::{
    DEFAULT_TIMEOUT_SECS, HttpGeocoder, HttpGeocoderConfig, HttpRouteCalculator,
    HttpRouteCalculatorConfig,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_SEARCH_FROM, ARG_SEARCH_GEOCODER_BASE_URL, ARG_SEARCH_OSRM_BASE_URL, ARG_SEARCH_QUERY,
    ARG_SEARCH_TIMEOUT_SECS, CliError, ENV_SEARCH_FROM, ENV_SEARCH_QUERY, parse_coordinate,
    write_json,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Geocode a free-text destination near the given origin, \
                 compute a driving route to it, and print the final search \
                 state with the camera viewport as JSON. A failed search is \
                 still printed; only setup errors exit non-zero.",
    about = "Search for a destination and route to it"
)]
#[ortho_config(prefix = "NEARBY")]
pub(crate) struct SearchArgs {
    /// Destination text, e.g. "McGill University".
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Current position as `lat,lon`.
    #[arg(long = ARG_SEARCH_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Base URL of the Nominatim search service.
    #[arg(long = ARG_SEARCH_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
    /// Base URL of the OSRM route service (e.g. "http://localhost:5000").
    #[arg(long = ARG_SEARCH_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Per-request timeout for both providers.
    #[arg(long = ARG_SEARCH_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    /// Destination text, never blank.
    pub(crate) query: String,
    /// Position the search starts from.
    pub(crate) origin: Coordinate,
    pub(crate) geocoder_base_url: String,
    pub(crate) osrm_base_url: String,
    pub(crate) timeout: Duration,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args
            .query
            .filter(|text| !text.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_SEARCH_QUERY,
                env: ENV_SEARCH_QUERY,
            })?;
        let from = args.from.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_FROM,
            env: ENV_SEARCH_FROM,
        })?;
        let origin = parse_coordinate(ARG_SEARCH_FROM, &from)?;

        let geocoder_base_url = args
            .geocoder_base_url
            .unwrap_or_else(|| HttpGeocoderConfig::default().base_url);
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpRouteCalculatorConfig::default().base_url);
        let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            query,
            origin,
            geocoder_base_url,
            osrm_base_url,
            timeout,
        })
    }
}

/// Providers used by one search invocation.
pub(crate) struct SearchBackends {
    pub(crate) geocoder: Box<dyn GeocodeResolver>,
    pub(crate) router: Box<dyn RouteCalculator>,
}

/// Builds the providers for the current search invocation.
pub(crate) trait SearchBackendBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchBackends, CliError>;
}

pub(crate) struct HttpSearchBackendBuilder;

impl SearchBackendBuilder for HttpSearchBackendBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchBackends, CliError> {
        let geocoder = HttpGeocoder::with_config(
            HttpGeocoderConfig::new(config.geocoder_base_url.clone())
                .with_timeout(config.timeout),
        )
        .map_err(|source| CliError::BuildProvider {
            provider: "geocoder",
            base_url: config.geocoder_base_url.clone(),
            source,
        })?;
        let router = HttpRouteCalculator::with_config(
            HttpRouteCalculatorConfig::new(config.osrm_base_url.clone())
                .with_timeout(config.timeout),
        )
        .map_err(|source| CliError::BuildProvider {
            provider: "route calculator",
            base_url: config.osrm_base_url.clone(),
            source,
        })?;
        Ok(SearchBackends {
            geocoder: Box::new(geocoder),
            router: Box::new(router),
        })
    }
}

/// Location source reporting a single authorised position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedLocation {
    origin: Coordinate,
}

impl FixedLocation {
    pub(crate) const fn new(origin: Coordinate) -> Self {
        Self { origin }
    }
}

impl LocationSource for FixedLocation {
    fn permission_state(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn request_permission(&self) {}

    fn position_updates(&self) -> PositionFeed {
        futures::stream::iter([Ok(Position::at(self.origin))]).boxed()
    }
}

/// What `nearby search` prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SearchReport {
    pub(crate) state: SearchState,
    pub(crate) viewport: ViewportState,
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &HttpSearchBackendBuilder, &mut stdout)
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn SearchBackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let backends = builder.build(&config)?;
    let report = execute_search(&config, backends)?;
    write_json(writer, &report)
}

fn execute_search(config: &SearchConfig, backends: SearchBackends) -> Result<SearchReport, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let location = LocationStream::new(FixedLocation::new(config.origin));
    let updates = location.start()?;
    let orchestrator =
        SearchOrchestrator::new(backends.geocoder, backends.router, location.handle());

    runtime.block_on(async {
        orchestrator.follow(updates).await;
        match orchestrator.submit(&config.query).await {
            SubmitOutcome::Applied(state) => {
                log::debug!("search for {:?} ended as {state:?}", config.query);
            }
            other => log::warn!("search for {:?} was not applied: {other:?}", config.query),
        }
    });

    Ok(SearchReport {
        state: orchestrator.state(),
        viewport: orchestrator.viewport(),
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
