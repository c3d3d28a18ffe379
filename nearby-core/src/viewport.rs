//! Map camera state and the operations that change it.
//!
//! All operations are synchronous state transitions with no I/O. The
//! [`Camera`] trait is what [`crate::SearchOrchestrator`] drives, so tests can
//! substitute a recording implementation; [`ViewportController`] is the real
//! one.

use crate::{BoundingRegion, Coordinate};

/// Closest the camera may zoom, in metres.
pub const MIN_DISTANCE: f64 = 100.0;
/// Furthest the camera may zoom out, in metres. Roughly half the equator.
pub const MAX_DISTANCE: f64 = 20_000_000.0;

/// How much of the map the camera shows.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CameraFrame {
    /// Camera distance from the ground in metres.
    Distance(f64),
    /// Exactly the given region, as set by a fit.
    Region(BoundingRegion),
}

/// Snapshot of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    /// Point the camera looks at.
    pub center: Coordinate,
    /// Zoom, either as a distance or a fitted region.
    pub frame: CameraFrame,
    /// Whether the camera is tracking the user's position.
    pub follows_user: bool,
}

impl ViewportState {
    /// Camera distance in metres. A fitted region reports its largest extent.
    #[must_use]
    pub fn distance(&self) -> f64 {
        match self.frame {
            CameraFrame::Distance(distance) => distance,
            CameraFrame::Region(region) => clamp_distance(region.extent_meters()),
        }
    }
}

/// Operations the search orchestrator and user gestures request.
pub trait Camera: Send {
    /// Center on `point` at `distance` metres. `follows_user` is recorded as
    /// given.
    fn center_on(&mut self, point: Coordinate, distance: f64, follows_user: bool);

    /// Multiply the current distance by `factor` about the current center.
    fn zoom(&mut self, factor: f64);

    /// Show exactly `region`.
    fn fit(&mut self, region: BoundingRegion);

    /// Center on the user for the "locate me" action. Follows the user only
    /// when no route is shown.
    fn go_to_user(&mut self, point: Coordinate, distance: f64, route_shown: bool) {
        self.center_on(point, distance, !route_shown);
    }

    /// Current camera snapshot.
    fn state(&self) -> ViewportState;
}

fn clamp_distance(distance: f64) -> f64 {
    distance.clamp(MIN_DISTANCE, MAX_DISTANCE)
}

/// The production [`Camera`].
///
/// # Examples
/// ```
/// use nearby_core::{Camera, Coordinate, ViewportController};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut camera = ViewportController::new(Coordinate::new(45.5017, -73.5673)?, 2_000.0);
/// camera.zoom(0.8);
/// assert_eq!(camera.state().distance(), 1_600.0);
/// assert!(!camera.state().follows_user);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    state: ViewportState,
}

impl ViewportController {
    /// A camera at `center`, following the user until the first move.
    #[must_use]
    pub fn new(center: Coordinate, distance: f64) -> Self {
        let distance = if distance.is_finite() {
            clamp_distance(distance)
        } else {
            MIN_DISTANCE
        };
        Self {
            state: ViewportState {
                center,
                frame: CameraFrame::Distance(distance),
                follows_user: true,
            },
        }
    }
}

impl Camera for ViewportController {
    fn center_on(&mut self, point: Coordinate, distance: f64, follows_user: bool) {
        let distance = if distance.is_finite() {
            clamp_distance(distance)
        } else {
            log::warn!("ignoring non-finite camera distance {distance}");
            self.state.distance()
        };
        self.state = ViewportState {
            center: point,
            frame: CameraFrame::Distance(distance),
            follows_user,
        };
    }

    fn zoom(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("ignoring invalid zoom factor {factor}");
            return;
        }
        let distance = clamp_distance(self.state.distance() * factor);
        self.state.frame = CameraFrame::Distance(distance);
        self.state.follows_user = false;
    }

    fn fit(&mut self, region: BoundingRegion) {
        self.state = ViewportState {
            center: region.center(),
            frame: CameraFrame::Region(region),
            follows_user: false,
        };
    }

    fn state(&self) -> ViewportState {
        self.state
    }
}
