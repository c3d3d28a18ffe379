//! Nominatim search API response types.
//!
//! The `jsonv2` format returns an array of candidates ranked by relevance.
//! Coordinates are encoded as decimal strings.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use nearby_core::{Coordinate, TransportError};
use serde::Deserialize;

/// One search candidate.
#[derive(Debug, Deserialize)]
pub struct SearchCandidate {
    /// Latitude in decimal degrees.
    pub lat: String,
    /// Longitude in decimal degrees.
    pub lon: String,
    /// Human-readable address, used for logging.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SearchCandidate {
    /// Parse the candidate's position.
    pub fn coordinate(&self) -> Result<Coordinate, TransportError> {
        let parse = |raw: &str, axis: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|err| TransportError::ParseError {
                    message: format!("invalid {axis} {raw:?}: {err}"),
                })
        };
        let lat = parse(&self.lat, "latitude")?;
        let lon = parse(&self.lon, "longitude")?;
        Coordinate::new(lat, lon).map_err(|err| TransportError::ParseError {
            message: err.to_string(),
        })
    }
}
