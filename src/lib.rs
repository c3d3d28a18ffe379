//! Facade crate for the NearBy map search engine.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the HTTP provider adapters and the JSON place catalog.

#![forbid(unsafe_code)]

pub use nearby_core::{
    BoundingRegion, Camera, CameraFrame, CatalogError, Category, Coordinate, CoordinateError,
    ErrorKind, GeocodeResolver, GeocodingError, LocationError, LocationHandle, LocationSource,
    LocationStream, LocationUpdates, OrchestratorConfig, PermissionState, Place, PlaceCatalog,
    PlaceIndex, Position, RouteCalculator, RouteResult, RoutingError, SearchError,
    SearchOrchestrator, SearchState, SubmitOutcome, TransportError, ViewportController,
    ViewportState, polyline,
};

#[cfg(feature = "http")]
pub use nearby_data::{
    HttpGeocoder, HttpGeocoderConfig, HttpRouteCalculator, HttpRouteCalculatorConfig,
    JsonPlaceCatalog, ProviderBuildError,
};
