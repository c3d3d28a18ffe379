//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// The `code` field indicates the response status; `routes` is present on
/// success and ranked best first.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route found between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    pub routes: Option<Vec<OsrmRoute>>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Check if OSRM found no path.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == "NoRoute"
    }
}

/// One candidate route.
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Encoded polyline, precision 5, when requested with
    /// `geometries=polyline`.
    pub geometry: String,
    /// Length in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
}
