//! Geographic coordinates and device positions.
//!
//! [`Coordinate`] is the immutable WGS84 value type shared by every component.
//! Conversions to [`geo::Coord`] follow the `x = longitude`, `y = latitude`
//! convention used by the `geo` ecosystem.

use std::str::FromStr;
use std::time::SystemTime;

use geo::Coord;
use thiserror::Error;

/// Errors returned when constructing or parsing a [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// Text did not have the `lat,lon` shape.
    #[error("expected `lat,lon`, found {0:?}")]
    Malformed(String),
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// # Examples
/// ```
/// use nearby_core::Coordinate;
///
/// # fn main() -> Result<(), nearby_core::CoordinateError> {
/// let mcgill = Coordinate::new(45.5048, -73.5772)?;
/// assert_eq!(mcgill.latitude(), 45.5048);
///
/// let parsed: Coordinate = "45.5048, -73.5772".parse()?;
/// assert_eq!(parsed, mcgill);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCoordinate"))]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and construct a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either axis is out of range or NaN.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a constant coordinate. Callers must pass in-range values.
    pub(crate) const fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Coord {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl TryFrom<Coord<f64>> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(value.y, value.x)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordinateError::Malformed(s.to_owned());
        let (lat, lon) = s.split_once(',').ok_or_else(malformed)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| malformed())?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| malformed())?;
        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

/// A device position reported by a location source.
///
/// Only the latest position is retained by [`crate::LocationStream`]; every
/// new value supersedes the previous one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Where the device is.
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in metres, when the platform reports one.
    pub accuracy_m: Option<f64>,
    /// When the fix was taken.
    pub timestamp: Option<SystemTime>,
}

impl Position {
    /// A position with no accuracy or timestamp metadata.
    #[must_use]
    pub const fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            timestamp: None,
        }
    }

    /// Attach a horizontal accuracy radius.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Attach the fix timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
