//! Driving routes between two coordinates.
//!
//! A [`RouteResult`] is produced once by a [`RouteCalculator`] and never
//! mutated afterwards. Distance and duration are copied from the provider
//! verbatim; the only local computation is the bounding region, which the
//! provider may supply or which is derived from the polyline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{BoundingRegion, Coordinate, TransportError};

/// Errors returned by [`RouteResult::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteResultError {
    /// The polyline contained no points.
    #[error("route polyline must contain at least one point")]
    EmptyPolyline,
    /// Distance was negative or not finite.
    #[error("route distance must be a finite, non-negative number of metres, found {0}")]
    InvalidDistance(f64),
    /// Duration was negative or not finite.
    #[error("route duration must be a finite, non-negative number of seconds, found {0}")]
    InvalidDuration(f64),
}

/// A drivable path from origin to destination.
///
/// # Examples
/// ```
/// use nearby_core::{Coordinate, RouteResult};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = vec![
///     Coordinate::new(45.4972, -73.5790)?,
///     Coordinate::new(45.5010, -73.5781)?,
///     Coordinate::new(45.5048, -73.5772)?,
/// ];
/// let route = RouteResult::from_polyline(path, 1_250.0, 240.0)?;
/// assert_eq!(route.polyline().len(), 3);
/// assert!(route.bounding_region().contains(route.polyline()[1]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    polyline: Vec<Coordinate>,
    bounding_region: BoundingRegion,
    distance_meters: f64,
    eta_seconds: f64,
}

impl RouteResult {
    /// Validate and construct a route with a provider-supplied region.
    ///
    /// # Errors
    ///
    /// Returns [`RouteResultError`] for an empty polyline or invalid metrics.
    pub fn new(
        polyline: Vec<Coordinate>,
        bounding_region: BoundingRegion,
        distance_meters: f64,
        eta_seconds: f64,
    ) -> Result<Self, RouteResultError> {
        if polyline.is_empty() {
            return Err(RouteResultError::EmptyPolyline);
        }
        if !distance_meters.is_finite() || distance_meters < 0.0 {
            return Err(RouteResultError::InvalidDistance(distance_meters));
        }
        if !eta_seconds.is_finite() || eta_seconds < 0.0 {
            return Err(RouteResultError::InvalidDuration(eta_seconds));
        }
        Ok(Self {
            polyline,
            bounding_region,
            distance_meters,
            eta_seconds,
        })
    }

    /// Construct a route whose region is the minimal rectangle around the
    /// polyline.
    ///
    /// # Errors
    ///
    /// Returns [`RouteResultError`] for an empty polyline or invalid metrics.
    pub fn from_polyline(
        polyline: Vec<Coordinate>,
        distance_meters: f64,
        eta_seconds: f64,
    ) -> Result<Self, RouteResultError> {
        let region =
            BoundingRegion::enclosing(&polyline).ok_or(RouteResultError::EmptyPolyline)?;
        Self::new(polyline, region, distance_meters, eta_seconds)
    }

    /// Ordered path from origin to destination.
    #[must_use]
    pub fn polyline(&self) -> &[Coordinate] {
        &self.polyline
    }

    /// Region the camera should fit to show the whole route.
    #[must_use]
    pub const fn bounding_region(&self) -> BoundingRegion {
        self.bounding_region
    }

    /// Route length in metres, as reported by the provider.
    #[must_use]
    pub const fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    /// Expected travel time in seconds, as reported by the provider.
    #[must_use]
    pub const fn eta_seconds(&self) -> f64 {
        self.eta_seconds
    }

    /// Expected travel time as a [`Duration`].
    #[must_use]
    pub fn eta(&self) -> Duration {
        Duration::from_secs_f64(self.eta_seconds)
    }
}

/// Errors from [`RouteCalculator::route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The provider found no drivable path.
    #[error("no route found")]
    NoRoute,
    /// The provider could not be reached or replied with garbage.
    #[error(transparent)]
    Unavailable(#[from] TransportError),
}

/// Compute a driving route between two coordinates.
///
/// Implementations return the provider's first candidate route only.
#[async_trait]
pub trait RouteCalculator: Send + Sync {
    /// Route from `from` to `to`.
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError>;
}

#[async_trait]
impl<T: RouteCalculator + ?Sized> RouteCalculator for Box<T> {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError> {
        (**self).route(from, to).await
    }
}

#[async_trait]
impl<T: RouteCalculator + ?Sized> RouteCalculator for Arc<T> {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError> {
        (**self).route(from, to).await
    }
}
