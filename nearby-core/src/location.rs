//! Live device position updates.
//!
//! [`LocationStream`] wraps a permission-gated platform [`LocationSource`]
//! and exposes the latest known [`Position`]. Updates are push-based: a
//! single call to [`LocationStream::start`] yields a [`LocationUpdates`]
//! stream which records each position into a shared snapshot before handing
//! it to the consumer. Readers such as the search orchestrator hold a
//! [`LocationHandle`] and only ever see read-only copies.
//!
//! Source errors do not end the stream. They are yielded as `Err` items and
//! retained as the last error until the next position arrives, so the
//! consumer recovers simply by continuing to poll.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use thiserror::Error;

use crate::Position;

/// Authorisation state of the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermissionState {
    /// The user allowed location access.
    Granted,
    /// The user refused location access. This persists until changed in the
    /// platform settings.
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Errors raised by [`LocationStream`] and its sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Location access was refused.
    #[error("location permission denied")]
    PermissionDenied,
    /// The permission prompt has not been answered yet.
    #[error("location permission not yet determined")]
    PermissionUndetermined,
    /// [`LocationStream::start`] was already called once.
    #[error("location updates were already started")]
    AlreadyStarted,
    /// The platform reported a failure for one update.
    #[error("location source error: {message}")]
    Source {
        /// Platform error message.
        message: String,
    },
}

/// Boxed stream of raw updates produced by a [`LocationSource`].
pub type PositionFeed = BoxStream<'static, Result<Position, LocationError>>;

/// Platform location service.
pub trait LocationSource: Send + Sync {
    /// Current authorisation state.
    fn permission_state(&self) -> PermissionState;

    /// Show the platform permission prompt. The answer may arrive later.
    fn request_permission(&self);

    /// Begin delivering position updates.
    fn position_updates(&self) -> PositionFeed;
}

#[derive(Debug, Default)]
struct Snapshot {
    position: Option<Position>,
    last_error: Option<LocationError>,
}

/// Read-only view of the latest position known to a [`LocationStream`].
#[derive(Debug, Clone, Default)]
pub struct LocationHandle {
    snapshot: Arc<Mutex<Snapshot>>,
}

impl LocationHandle {
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest position, if any has been received.
    #[must_use]
    pub fn current_position(&self) -> Option<Position> {
        self.lock().position.clone()
    }

    /// Error reported since the last successful position, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<LocationError> {
        self.lock().last_error.clone()
    }

    fn record(&self, update: &Result<Position, LocationError>) {
        let mut snapshot = self.lock();
        match update {
            Ok(position) => {
                snapshot.position = Some(position.clone());
                snapshot.last_error = None;
            }
            Err(err) => snapshot.last_error = Some(err.clone()),
        }
    }
}

/// Owner of the latest device position.
///
/// # Examples
/// ```
/// use futures::StreamExt;
/// use nearby_core::{Coordinate, LocationStream, Position};
/// use nearby_core::test_support::ScriptedLocationSource;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let here = Position::at(Coordinate::new(45.5017, -73.5673)?);
/// let stream = LocationStream::new(ScriptedLocationSource::granted([here.clone()]));
/// let mut updates = stream.start()?;
/// futures::executor::block_on(updates.next());
/// assert_eq!(stream.current_position(), Some(here));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LocationStream<S> {
    source: S,
    handle: LocationHandle,
    started: AtomicBool,
}

impl<S: LocationSource> LocationStream<S> {
    /// Wrap a platform source. No updates flow until [`Self::start`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            handle: LocationHandle::default(),
            started: AtomicBool::new(false),
        }
    }

    /// The wrapped platform source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Current authorisation state, queried from the source on every call.
    pub fn permission_state(&self) -> PermissionState {
        self.source.permission_state()
    }

    /// Latest position, if any has been received.
    pub fn current_position(&self) -> Option<Position> {
        self.handle.current_position()
    }

    /// A cloneable read-only view for other components.
    pub fn handle(&self) -> LocationHandle {
        self.handle.clone()
    }

    /// Start the update stream.
    ///
    /// When permission is undetermined the platform prompt is shown first. The
    /// stream can be started once; a refused start because of permission does
    /// not count, so callers may retry once the user has answered.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::PermissionDenied`],
    /// [`LocationError::PermissionUndetermined`] if the prompt is still
    /// pending, or [`LocationError::AlreadyStarted`].
    pub fn start(&self) -> Result<LocationUpdates, LocationError> {
        if self.started.load(Ordering::Acquire) {
            return Err(LocationError::AlreadyStarted);
        }
        if self.source.permission_state() == PermissionState::Undetermined {
            log::debug!("requesting location permission");
            self.source.request_permission();
        }
        match self.source.permission_state() {
            PermissionState::Granted => {}
            PermissionState::Denied => return Err(LocationError::PermissionDenied),
            PermissionState::Undetermined => return Err(LocationError::PermissionUndetermined),
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(LocationError::AlreadyStarted);
        }
        Ok(LocationUpdates {
            inner: self.source.position_updates(),
            handle: self.handle.clone(),
        })
    }
}

/// Stream of position updates that keeps the shared snapshot current.
///
/// Dropping the stream unsubscribes. The last known position stays readable
/// through the [`LocationHandle`].
pub struct LocationUpdates {
    inner: PositionFeed,
    handle: LocationHandle,
}

impl std::fmt::Debug for LocationUpdates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationUpdates")
            .field("inner", &"<stream>")
            .field("handle", &self.handle)
            .finish()
    }
}

impl Stream for LocationUpdates {
    type Item = Result<Position, LocationError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.inner.poll_next_unpin(cx);
        if let Poll::Ready(Some(update)) = &polled {
            this.handle.record(update);
        }
        polled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use crate::test_support::ScriptedLocationSource;
    use futures::executor::block_on;
    use rstest::{fixture, rstest};

    #[fixture]
    fn here() -> Position {
        Position::at(Coordinate::new(45.5017, -73.5673).expect("valid coordinate"))
    }

    #[fixture]
    fn there() -> Position {
        Position::at(Coordinate::new(45.5048, -73.5772).expect("valid coordinate"))
    }

    #[rstest]
    fn no_position_before_start(here: Position) {
        let stream = LocationStream::new(ScriptedLocationSource::granted([here]));
        assert!(stream.current_position().is_none());
    }

    #[rstest]
    fn keeps_only_latest_position(here: Position, there: Position) {
        let stream = LocationStream::new(ScriptedLocationSource::granted([here, there.clone()]));
        let updates = stream.start().expect("stream starts");
        let seen: Vec<_> = block_on(updates.collect());
        assert_eq!(seen.len(), 2);
        assert_eq!(stream.current_position(), Some(there));
    }

    #[rstest]
    fn second_start_is_refused(here: Position) {
        let stream = LocationStream::new(ScriptedLocationSource::granted([here]));
        let _updates = stream.start().expect("first start");
        assert_eq!(stream.start().expect_err("restart"), LocationError::AlreadyStarted);
    }

    #[rstest]
    fn denied_permission_is_persistent() {
        let stream =
            LocationStream::new(ScriptedLocationSource::with_permission(PermissionState::Denied));
        assert_eq!(stream.start().expect_err("denied"), LocationError::PermissionDenied);
        assert_eq!(stream.permission_state(), PermissionState::Denied);
        assert_eq!(stream.start().expect_err("still denied"), LocationError::PermissionDenied);
    }

    #[rstest]
    fn undetermined_permission_prompts_then_allows_retry() {
        let source = ScriptedLocationSource::with_permission(PermissionState::Undetermined);
        let stream = LocationStream::new(source);
        assert_eq!(
            stream.start().expect_err("prompt pending"),
            LocationError::PermissionUndetermined
        );
        assert_eq!(stream.source().prompts(), 1);

        stream.source().set_permission(PermissionState::Granted);
        assert!(stream.start().is_ok());
    }

    #[rstest]
    fn prompt_granted_immediately_starts_stream(here: Position) {
        let source = ScriptedLocationSource::granted([here])
            .starting_as(PermissionState::Undetermined)
            .granting_on_request();
        let stream = LocationStream::new(source);
        assert!(stream.start().is_ok());
        assert_eq!(stream.source().prompts(), 1);
    }

    #[rstest]
    fn source_errors_do_not_end_the_stream(here: Position) {
        let failure = LocationError::Source {
            message: "kCLErrorLocationUnknown".to_owned(),
        };
        let stream = LocationStream::new(ScriptedLocationSource::scripted(vec![
            Err(failure.clone()),
            Ok(here.clone()),
        ]));
        let handle = stream.handle();
        let mut updates = stream.start().expect("stream starts");

        assert_eq!(block_on(updates.next()), Some(Err(failure.clone())));
        assert_eq!(handle.last_error(), Some(failure));
        assert!(handle.current_position().is_none());

        assert_eq!(block_on(updates.next()), Some(Ok(here.clone())));
        assert_eq!(handle.last_error(), None);
        assert_eq!(handle.current_position(), Some(here));
    }
}
