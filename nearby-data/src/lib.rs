//! Provider adapters for the NearBy engine.
//!
//! Responsibilities:
//! - Implement the `nearby-core` provider traits over HTTP services.
//! - Read the place catalog from disk.
//! - Own the wire formats of those providers.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `nearby-core`).
//! - Report every transport failure as a `TransportError`; never panic on
//!   provider input.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod fs;
pub mod geocoding;
mod http;
pub mod routing;

pub use catalog::JsonPlaceCatalog;
pub use geocoding::{HttpGeocoder, HttpGeocoderConfig};
pub use http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError};
pub use routing::{HttpRouteCalculator, HttpRouteCalculatorConfig};
