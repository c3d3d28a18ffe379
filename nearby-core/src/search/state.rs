//! Search queries, outcomes and the published search state.

use std::fmt;

use thiserror::Error;

use crate::{Coordinate, GeocodingError, RouteResult, RoutingError};

/// Monotonically increasing identifier used to detect stale results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequestId(u64);

impl RequestId {
    /// The identifier issued after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A submitted search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchQuery {
    text: String,
    request_id: RequestId,
}

impl SearchQuery {
    /// Trim `text` and pair it with `request_id`. Returns `None` when nothing
    /// but whitespace remains.
    #[must_use]
    pub fn new(text: &str, request_id: RequestId) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_owned(),
            request_id,
        })
    }

    /// Trimmed query text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identifier captured when the query was submitted.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }
}

/// Flat classification of [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// No user position was known when the search started.
    LocationUnavailable,
    /// Geocoding found no candidate.
    NotFound,
    /// Routing found no path.
    NoRoute,
    /// A provider could not be reached.
    Unavailable,
}

/// Why a search ended in [`SearchState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SearchError {
    /// No user position was known when the search started.
    #[error("user location is not available yet")]
    LocationUnavailable,
    /// Geocoding found no candidate.
    #[error("no results found for: {query}")]
    NotFound {
        /// Query text that matched nothing.
        query: String,
    },
    /// Routing found no path to the destination.
    #[error("no route found")]
    NoRoute,
    /// A provider failed at the transport or service level.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Provider failure detail.
        message: String,
    },
}

impl SearchError {
    /// The flat error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LocationUnavailable => ErrorKind::LocationUnavailable,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NoRoute => ErrorKind::NoRoute,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
        }
    }
}

impl From<GeocodingError> for SearchError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::NotFound { query } => Self::NotFound { query },
            GeocodingError::Unavailable(source) => Self::Unavailable {
                message: source.to_string(),
            },
        }
    }
}

impl From<RoutingError> for SearchError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::NoRoute => Self::NoRoute,
            RoutingError::Unavailable(source) => Self::Unavailable {
                message: source.to_string(),
            },
        }
    }
}

/// The single observable search state.
///
/// Combining destination, route and error into one variant rules out
/// impossible mixes such as a destination without a route.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum SearchState {
    /// Nothing in flight and nothing shown.
    #[default]
    Idle,
    /// Geocoding or routing is running for `query`.
    Searching {
        /// The active query.
        query: SearchQuery,
    },
    /// The destination was found and a route computed.
    Resolved {
        /// The query that produced this result.
        query: SearchQuery,
        /// Geocoded destination.
        destination: Coordinate,
        /// Route from the user to `destination`.
        route: RouteResult,
    },
    /// The search failed.
    Failed {
        /// The query that failed.
        query: SearchQuery,
        /// Why it failed.
        reason: SearchError,
    },
}

impl SearchState {
    /// The query this state belongs to, if any.
    #[must_use]
    pub const fn query(&self) -> Option<&SearchQuery> {
        match self {
            Self::Idle => None,
            Self::Searching { query }
            | Self::Resolved { query, .. }
            | Self::Failed { query, .. } => Some(query),
        }
    }

    /// Whether a route is on the map.
    #[must_use]
    pub const fn shows_route(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Failure classification, for [`SearchState::Failed`] only.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { reason, .. } => Some(reason.kind()),
            _ => None,
        }
    }
}

/// Result of [`crate::SearchOrchestrator::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The text was blank; nothing happened.
    Ignored,
    /// A newer submit or a clear overtook this one; its result was dropped.
    Superseded,
    /// This search reached a terminal state.
    Applied(SearchState),
}
