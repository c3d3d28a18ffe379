//! HTTP plumbing shared by the provider adapters.

use std::time::Duration;

use nearby_core::TransportError;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = "nearby-engine/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Failure constructing an HTTP provider.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The base URL did not parse.
    #[error("invalid base URL {url}: {source}")]
    BaseUrl {
        /// URL as configured.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry a path, e.g. `mailto:`.
    #[error("base URL {url} cannot be used as an HTTP base")]
    NotABase {
        /// URL as configured.
        url: String,
    },
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ProviderBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ProviderBuildError::HttpClient)
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|source| ProviderBuildError::BaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::NotABase {
            url: raw.to_owned(),
        });
    }
    Ok(url)
}

/// Append `segments` to the base URL's path, ignoring a trailing slash.
pub(crate) fn join_path<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) fn convert_reqwest_error(
    error: &reqwest::Error,
    url: &str,
    timeout: Duration,
) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout {
            url: url.to_owned(),
            timeout_secs: timeout.as_secs(),
        };
    }

    if let Some(status) = error.status() {
        return TransportError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    TransportError::NetworkError {
        url: url.to_owned(),
        message: error.to_string(),
    }
}
