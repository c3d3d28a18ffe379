//! HTTP geocoding against a Nominatim-compatible search service.
//!
//! [`HttpGeocoder`] implements [`nearby_core::GeocodeResolver`]. The core
//! trait is async, so requests run on the caller's executor; no runtime is
//! owned here.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use nearby_core::{Coordinate, GeocodeResolver};
//! use nearby_data::geocoding::{HttpGeocoder, HttpGeocoderConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpGeocoderConfig::new("https://nominatim.openstreetmap.org")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let geocoder = HttpGeocoder::with_config(config)?;
//!
//! let near = Coordinate::new(45.5017, -73.5673)?;
//! let found = geocoder.resolve("McGill University", Some(near)).await?;
//! println!("{found}");
//! # Ok(())
//! # }
//! ```

mod nominatim;
mod provider;

pub use provider::{DEFAULT_BIAS_SPAN_DEG, HttpGeocoder, HttpGeocoderConfig};
