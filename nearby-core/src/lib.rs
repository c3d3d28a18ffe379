//! Core domain for the NearBy map search engine.
//!
//! The crate turns free-text destination queries into a geocoded coordinate
//! and a driving route from the user's live position, and keeps the map
//! camera in step with search results and location updates.
//!
//! Providers are abstracted behind traits so the orchestration can run
//! against real HTTP services (see the `nearby-data` crate) or in-memory
//! doubles from [`test_support`].
//!
//! - [`LocationStream`] owns the latest device [`Position`].
//! - [`GeocodeResolver`] and [`RouteCalculator`] talk to providers.
//! - [`ViewportController`] owns the camera.
//! - [`SearchOrchestrator`] sequences all of them and publishes
//!   [`SearchState`].

#![forbid(unsafe_code)]

mod coordinate;
mod geocode;
mod location;
mod place;
pub mod polyline;
mod region;
mod route;
mod search;
mod transport;
mod viewport;

#[doc(hidden)]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError, Position};
pub use geocode::{GeocodeResolver, GeocodingError};
pub use location::{
    LocationError, LocationHandle, LocationSource, LocationStream, LocationUpdates,
    PermissionState, PositionFeed,
};
pub use place::{CatalogError, Category, Place, PlaceCatalog, PlaceIndex};
pub use polyline::PolylineError;
pub use region::{BoundingRegion, METERS_PER_DEGREE, RegionError};
pub use route::{RouteCalculator, RouteResult, RouteResultError, RoutingError};
pub use search::{
    ErrorKind, FALLBACK_CENTER, OrchestratorConfig, RequestId, SearchError, SearchOrchestrator,
    SearchQuery, SearchState, StateUpdates, SubmitOutcome,
};
pub use transport::TransportError;
pub use viewport::{Camera, CameraFrame, MAX_DISTANCE, MIN_DISTANCE, ViewportController, ViewportState};
