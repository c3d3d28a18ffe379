//! Resolve free-text queries to a single coordinate.
//!
//! The [`GeocodeResolver`] trait abstracts the geocoding provider. It returns
//! exactly one best match: when the provider ranks several candidates, the
//! top-ranked one wins and ties are not broken further.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{Coordinate, TransportError};

/// Errors from [`GeocodeResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    /// The provider returned no candidate for the query.
    #[error("no results found for: {query}")]
    NotFound {
        /// The query that matched nothing.
        query: String,
    },
    /// The provider could not be reached or replied with garbage.
    #[error(transparent)]
    Unavailable(#[from] TransportError),
}

/// Resolve a natural-language query to a coordinate.
///
/// `bias` is the caller's current position when known. Implementations should
/// use it to prefer nearby matches, but a correct answer must not depend on
/// it. At most one call per search is outstanding from the orchestrator;
/// implementations need not serialise concurrent calls themselves.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use nearby_core::{Coordinate, GeocodeResolver, GeocodingError};
///
/// struct Landmarks;
///
/// #[async_trait]
/// impl GeocodeResolver for Landmarks {
///     async fn resolve(
///         &self,
///         query: &str,
///         _bias: Option<Coordinate>,
///     ) -> Result<Coordinate, GeocodingError> {
///         match query {
///             "McGill University" => Ok(Coordinate::new(45.5048, -73.5772).unwrap()),
///             _ => Err(GeocodingError::NotFound { query: query.to_owned() }),
///         }
///     }
/// }
///
/// let found = futures::executor::block_on(Landmarks.resolve("McGill University", None));
/// assert!(found.is_ok());
/// ```
#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Resolve `query` to its best-matching coordinate.
    async fn resolve(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError>;
}

#[async_trait]
impl<T: GeocodeResolver + ?Sized> GeocodeResolver for Box<T> {
    async fn resolve(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError> {
        (**self).resolve(query, bias).await
    }
}

#[async_trait]
impl<T: GeocodeResolver + ?Sized> GeocodeResolver for Arc<T> {
    async fn resolve(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError> {
        (**self).resolve(query, bias).await
    }
}
