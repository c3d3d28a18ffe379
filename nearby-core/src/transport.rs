//! Transport-level failures shared by the geocoding and routing providers.

use thiserror::Error;

/// A provider could not be reached or answered with something unusable.
///
/// The orchestrator does not distinguish between these cases: all of them
/// surface as [`crate::SearchError::Unavailable`]. The detail is kept for
/// logging and for callers that talk to providers directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// URL that was requested.
        url: String,
        /// Underlying error message.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL that was requested.
        url: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Underlying error message.
        message: String,
    },
    /// The provider reported an error code in an otherwise valid response.
    #[error("provider error {code}: {message}")]
    ServiceError {
        /// Provider-specific error code.
        code: String,
        /// Provider-supplied message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    ParseError {
        /// Decoder error message.
        message: String,
    },
}
