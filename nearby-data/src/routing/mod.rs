//! HTTP route calculation against an OSRM Route service.
//!
//! [`HttpRouteCalculator`] implements [`nearby_core::RouteCalculator`] by
//! requesting a single driving route with full overview geometry encoded as
//! a precision-5 polyline.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use nearby_core::{Coordinate, RouteCalculator};
//! use nearby_data::routing::{HttpRouteCalculator, HttpRouteCalculatorConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpRouteCalculatorConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60));
//! let router = HttpRouteCalculator::with_config(config)?;
//!
//! let from = Coordinate::new(45.4972, -73.579)?;
//! let to = Coordinate::new(45.5048, -73.5772)?;
//! let route = router.route(from, to).await?;
//! println!("{:.0} m in {:?}", route.distance_meters(), route.eta());
//! # Ok(())
//! # }
//! ```

mod osrm;
mod provider;

pub use provider::{HttpRouteCalculator, HttpRouteCalculatorConfig};
