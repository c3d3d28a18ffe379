//! HTTP `RouteCalculator` using OSRM's Route API.

use std::time::Duration;

use async_trait::async_trait;
use nearby_core::polyline::{self, DEFAULT_PRECISION};
use nearby_core::{Coordinate, RouteCalculator, RouteResult, RoutingError, TransportError};
use reqwest::Client;
use url::Url;

use super::osrm::RouteResponse;
use crate::http::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, build_client,
    convert_reqwest_error, join_path, parse_base_url,
};

/// Configuration for [`HttpRouteCalculator`].
#[derive(Debug, Clone)]
pub struct HttpRouteCalculatorConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpRouteCalculatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpRouteCalculatorConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Driving route calculator backed by OSRM.
///
/// Only the first route OSRM returns is used. Distance and duration are
/// copied verbatim; the geometry is decoded from precision-5 polyline and the
/// bounding region is the minimal rectangle around it.
#[derive(Debug)]
pub struct HttpRouteCalculator {
    client: Client,
    base: Url,
    config: HttpRouteCalculatorConfig,
}

impl HttpRouteCalculator {
    /// Create a calculator with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteCalculatorConfig::new(base_url))
    }

    /// Create a calculator with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpRouteCalculatorConfig) -> Result<Self, ProviderBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &HttpRouteCalculatorConfig {
        &self.config
    }

    /// Build `{base}/route/v1/driving/{lon},{lat};{lon},{lat}`.
    fn build_route_url(&self, from: Coordinate, to: Coordinate) -> Url {
        let coords = format!(
            "{},{};{},{}",
            from.longitude(),
            from.latitude(),
            to.longitude(),
            to.latitude()
        );
        let mut url = join_path(&self.base, ["route", "v1", "driving", coords.as_str()]);
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "polyline");
        url
    }

    fn convert_response(response: RouteResponse) -> Result<RouteResult, RoutingError> {
        if response.is_no_route() {
            return Err(RoutingError::NoRoute);
        }
        if !response.is_ok() {
            return Err(TransportError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            }
            .into());
        }

        let Some(best) = response.routes.and_then(|routes| routes.into_iter().next()) else {
            return Err(RoutingError::NoRoute);
        };

        let path = polyline::decode(&best.geometry, DEFAULT_PRECISION).map_err(|err| {
            TransportError::ParseError {
                message: format!("invalid route geometry: {err}"),
            }
        })?;
        RouteResult::from_polyline(path, best.distance, best.duration).map_err(|err| {
            TransportError::ParseError {
                message: err.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl RouteCalculator for HttpRouteCalculator {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError> {
        let url = self.build_route_url(from, to);
        let timeout = self.config.timeout;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?;

        // OSRM answers NoRoute with HTTP 400 and a JSON body, so decode the
        // body before looking at the status.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?;
        let parsed: RouteResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(TransportError::HttpError {
                    url: url.to_string(),
                    status: status.as_u16(),
                    message: body,
                }
                .into());
            }
            Err(err) => {
                return Err(TransportError::ParseError {
                    message: err.to_string(),
                }
                .into());
            }
        };

        Self::convert_response(parsed)
    }
}
