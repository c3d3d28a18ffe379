//! Axis-aligned geographic regions.
//!
//! A [`BoundingRegion`] is described the way map cameras describe a visible
//! area: a center plus a latitude and longitude span in degrees. Regions do
//! not model the antimeridian; spans are clamped to the valid coordinate range
//! when converted to a [`geo::Rect`].

use geo::{BoundingRect, Coord, Intersects, LineString, Rect};
use thiserror::Error;

use crate::Coordinate;

/// Approximate length of one degree of latitude in metres.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Errors returned by [`BoundingRegion::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// A span was negative, NaN or infinite.
    #[error("region span must be a finite, non-negative number of degrees, found {0}")]
    InvalidSpan(f64),
}

/// The minimal rectangle (center plus spans) enclosing a set of points.
///
/// # Examples
/// ```
/// use nearby_core::{BoundingRegion, Coordinate};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = [
///     Coordinate::new(45.50, -73.58)?,
///     Coordinate::new(45.52, -73.56)?,
/// ];
/// let region = BoundingRegion::enclosing(&path).expect("non-empty path");
/// assert!((region.span_lat() - 0.02).abs() < 1e-9);
/// assert!(region.contains(path[0]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingRegion {
    center: Coordinate,
    span_lat: f64,
    span_lon: f64,
}

impl BoundingRegion {
    /// Validate and construct a region from its center and spans.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidSpan`] for negative or non-finite spans.
    pub fn new(center: Coordinate, span_lat: f64, span_lon: f64) -> Result<Self, RegionError> {
        for span in [span_lat, span_lon] {
            if !span.is_finite() || span < 0.0 {
                return Err(RegionError::InvalidSpan(span));
            }
        }
        Ok(Self {
            center,
            span_lat,
            span_lon,
        })
    }

    /// Region of the given spans centred on `center`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidSpan`] for negative or non-finite spans.
    pub fn around(center: Coordinate, span_lat: f64, span_lon: f64) -> Result<Self, RegionError> {
        Self::new(center, span_lat, span_lon)
    }

    /// Minimal region enclosing every point, or `None` for an empty slice.
    #[must_use]
    pub fn enclosing(points: &[Coordinate]) -> Option<Self> {
        let line: LineString<f64> = points.iter().copied().map(Coord::from).collect();
        let rect = line.bounding_rect()?;
        Self::from_rect(rect)
    }

    fn from_rect(rect: Rect<f64>) -> Option<Self> {
        let center = Coordinate::try_from(rect.center()).ok()?;
        Self::new(center, rect.height(), rect.width()).ok()
    }

    /// Center of the region.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Latitude span in degrees.
    #[must_use]
    pub const fn span_lat(&self) -> f64 {
        self.span_lat
    }

    /// Longitude span in degrees.
    #[must_use]
    pub const fn span_lon(&self) -> f64 {
        self.span_lon
    }

    /// Axis-aligned rectangle (`x = longitude`, `y = latitude`), clamped to
    /// the valid coordinate range.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        let half_lat = self.span_lat / 2.0;
        let half_lon = self.span_lon / 2.0;
        let lat = self.center.latitude();
        let lon = self.center.longitude();
        Rect::new(
            Coord {
                x: (lon - half_lon).max(-180.0),
                y: (lat - half_lat).max(-90.0),
            },
            Coord {
                x: (lon + half_lon).min(180.0),
                y: (lat + half_lat).min(90.0),
            },
        )
    }

    /// Whether `point` lies inside the region. Boundary points are inside.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        self.to_rect().intersects(&Coord::from(point))
    }

    /// Largest extent of the region in metres, using an equirectangular
    /// approximation at the region's center latitude.
    #[must_use]
    pub fn extent_meters(&self) -> f64 {
        let lat_m = self.span_lat * METERS_PER_DEGREE;
        let lon_m = self.span_lon * METERS_PER_DEGREE * self.center.latitude().to_radians().cos();
        lat_m.max(lon_m)
    }
}
