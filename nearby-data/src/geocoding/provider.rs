//! HTTP `GeocodeResolver` backed by a Nominatim search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use nearby_core::{
    BoundingRegion, Coordinate, GeocodeResolver, GeocodingError, TransportError,
};
use reqwest::Client;
use url::Url;

use super::nominatim::SearchCandidate;
use crate::http::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, build_client,
    convert_reqwest_error, join_path, parse_base_url,
};

/// Side of the square viewbox placed around the bias origin, in degrees.
pub const DEFAULT_BIAS_SPAN_DEG: f64 = 0.1;

/// Configuration for [`HttpGeocoder`].
#[derive(Debug, Clone)]
pub struct HttpGeocoderConfig {
    /// Base URL of the Nominatim service.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests. Nominatim's usage policy requires an
    /// identifying agent.
    pub user_agent: String,
    /// Viewbox span around the bias origin, in degrees.
    pub bias_span_deg: f64,
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            bias_span_deg: DEFAULT_BIAS_SPAN_DEG,
        }
    }
}

impl HttpGeocoderConfig {
    /// Create a configuration for the given base URL.
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

    /// Set the viewbox span used for location bias.
    #[must_use]
    pub fn with_bias_span(mut self, degrees: f64) -> Self {
        self.bias_span_deg = degrees;
        self
    }
}

/// Geocoder calling `GET {base}/search?q=..&format=jsonv2&limit=1`.
///
/// Only the top-ranked candidate is requested. A bias origin adds a viewbox
/// around it, which Nominatim uses to prefer nearby matches without
/// excluding others.
#[derive(Debug)]
pub struct HttpGeocoder {
    client: Client,
    base: Url,
    config: HttpGeocoderConfig,
}

impl HttpGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &HttpGeocoderConfig {
        &self.config
    }

    fn build_search_url(&self, query: &str, bias: Option<Coordinate>) -> Url {
        let mut url = join_path(&self.base, ["search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("format", "jsonv2")
                .append_pair("limit", "1");
            let span = self.config.bias_span_deg;
            if let Some(rect) = bias
                .and_then(|origin| BoundingRegion::around(origin, span, span).ok())
                .map(|region| region.to_rect())
            {
                let viewbox = format!(
                    "{},{},{},{}",
                    rect.min().x,
                    rect.max().y,
                    rect.max().x,
                    rect.min().y
                );
                pairs.append_pair("viewbox", &viewbox);
            }
        }
        url
    }

    fn convert_response(
        query: &str,
        candidates: Vec<SearchCandidate>,
    ) -> Result<Coordinate, GeocodingError> {
        let Some(best) = candidates.into_iter().next() else {
            return Err(GeocodingError::NotFound {
                query: query.to_owned(),
            });
        };
        let coordinate = best.coordinate()?;
        log::debug!(
            "geocoded {query:?} to {coordinate} ({})",
            best.display_name.as_deref().unwrap_or("unnamed")
        );
        Ok(coordinate)
    }
}

#[async_trait]
impl GeocodeResolver for HttpGeocoder {
    async fn resolve(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError> {
        let url = self.build_search_url(query, bias);
        let timeout = self.config.timeout;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?;

        let candidates: Vec<SearchCandidate> =
            response
                .json()
                .await
                .map_err(|err| TransportError::ParseError {
                    message: err.to_string(),
                })?;

        Self::convert_response(query, candidates)
    }
}
