//! The search state machine.

use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{Stream, StreamExt};

use super::{RequestId, SearchError, SearchQuery, SearchState, SubmitOutcome};
use crate::{
    BoundingRegion, Camera, Coordinate, GeocodeResolver, LocationError, LocationHandle, Position,
    RouteCalculator, ViewportController, ViewportState,
};

/// Camera center used before any position is known.
pub const FALLBACK_CENTER: Coordinate = Coordinate::from_degrees(45.501_690, -73.567_253);

/// Stream of published search states returned by
/// [`SearchOrchestrator::subscribe`].
pub type StateUpdates = UnboundedReceiver<SearchState>;

/// Camera defaults applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorConfig {
    /// Initial camera distance and auto-center distance, in metres.
    pub default_distance: f64,
    /// Factor applied by [`SearchOrchestrator::zoom_in`].
    pub zoom_in_factor: f64,
    /// Factor applied by [`SearchOrchestrator::zoom_out`].
    pub zoom_out_factor: f64,
    /// Where the camera starts before the user is located.
    pub fallback_center: Coordinate,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_distance: 2_000.0,
            zoom_in_factor: 0.8,
            zoom_out_factor: 1.2,
            fallback_center: FALLBACK_CENTER,
        }
    }
}

struct Inner<C> {
    state: SearchState,
    latest: RequestId,
    camera: C,
    auto_centered: bool,
    subscribers: Vec<UnboundedSender<SearchState>>,
}

impl<C> Inner<C> {
    fn publish(&mut self, state: SearchState) {
        log::debug!("search state -> {}", state_name(&state));
        self.subscribers
            .retain(|tx| tx.unbounded_send(state.clone()).is_ok());
        self.state = state;
    }

    fn issue_request(&mut self) -> RequestId {
        self.latest = self.latest.next();
        self.latest
    }
}

const fn state_name(state: &SearchState) -> &'static str {
    match state {
        SearchState::Idle => "idle",
        SearchState::Searching { .. } => "searching",
        SearchState::Resolved { .. } => "resolved",
        SearchState::Failed { .. } => "failed",
    }
}

/// Sequences geocoding and routing for the latest submitted query and keeps
/// the camera in step.
///
/// The orchestrator is the only writer of [`SearchState`]. Every asynchronous
/// result is checked against the latest request id before it is applied, so a
/// slow response to an earlier query never overwrites a newer one. Earlier
/// calls are not cancelled; their results are dropped on arrival.
///
/// State, request counter and camera share one lock which is never held
/// across an `.await`, so concurrent completions apply atomically.
///
/// # Examples
/// ```
/// use futures::executor::block_on;
/// use nearby_core::{
///     Coordinate, LocationStream, Position, RouteResult, SearchOrchestrator, SearchState,
///     SubmitOutcome,
/// };
/// use nearby_core::test_support::{ScriptedLocationSource, StubGeocoder, StubRouteCalculator};
/// use futures::StreamExt;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let here = Coordinate::new(45.4972, -73.5790)?;
/// let mcgill = Coordinate::new(45.5048, -73.5772)?;
/// let stream = LocationStream::new(ScriptedLocationSource::granted([Position::at(here)]));
/// let orchestrator = SearchOrchestrator::new(
///     StubGeocoder::new().with_answer("McGill University", mcgill),
///     StubRouteCalculator::with_route(RouteResult::from_polyline(vec![here, mcgill], 900.0, 180.0)?),
///     stream.handle(),
/// );
/// block_on(orchestrator.follow(stream.start()?));
///
/// let outcome = block_on(orchestrator.submit("McGill University"));
/// assert!(matches!(outcome, SubmitOutcome::Applied(SearchState::Resolved { .. })));
/// # Ok(())
/// # }
/// ```
pub struct SearchOrchestrator<G, R, C = ViewportController> {
    geocoder: G,
    router: R,
    location: LocationHandle,
    config: OrchestratorConfig,
    inner: Mutex<Inner<C>>,
}

impl<G, R> SearchOrchestrator<G, R>
where
    G: GeocodeResolver,
    R: RouteCalculator,
{
    /// Build an orchestrator with the default configuration.
    pub fn new(geocoder: G, router: R, location: LocationHandle) -> Self {
        Self::with_config(geocoder, router, location, OrchestratorConfig::default())
    }

    /// Build an orchestrator whose camera starts at the configured fallback
    /// center.
    pub fn with_config(
        geocoder: G,
        router: R,
        location: LocationHandle,
        config: OrchestratorConfig,
    ) -> Self {
        let camera = ViewportController::new(config.fallback_center, config.default_distance);
        Self::with_camera(geocoder, router, location, config, camera)
    }
}

impl<G, R, C> SearchOrchestrator<G, R, C>
where
    G: GeocodeResolver,
    R: RouteCalculator,
    C: Camera,
{
    /// Build an orchestrator driving a caller-supplied camera.
    pub fn with_camera(
        geocoder: G,
        router: R,
        location: LocationHandle,
        config: OrchestratorConfig,
        camera: C,
    ) -> Self {
        Self {
            geocoder,
            router,
            location,
            config,
            inner: Mutex::new(Inner {
                state: SearchState::Idle,
                latest: RequestId::default(),
                camera,
                auto_centered: false,
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current search state.
    pub fn state(&self) -> SearchState {
        self.lock().state.clone()
    }

    /// Current camera snapshot.
    pub fn viewport(&self) -> ViewportState {
        self.lock().camera.state()
    }

    /// The configuration in use.
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Observe the search state: the current value first, then every
    /// transition in order. Dropping the stream unsubscribes.
    pub fn subscribe(&self) -> StateUpdates {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.lock();
        if tx.unbounded_send(inner.state.clone()).is_ok() {
            inner.subscribers.push(tx);
        }
        rx
    }

    /// Run a search for `text`.
    ///
    /// Blank text is ignored entirely: it never supersedes the search in
    /// flight. Otherwise the state moves to [`SearchState::Searching`]
    /// and, once both providers answer, to `Resolved` or `Failed`, unless a
    /// later [`Self::submit`] or [`Self::clear`] has superseded this call.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let (query, origin) = {
            let mut inner = self.lock();
            let request = inner.latest.next();
            let Some(query) = SearchQuery::new(text, request) else {
                log::debug!("ignoring blank search");
                return SubmitOutcome::Ignored;
            };
            inner.issue_request();
            inner.publish(SearchState::Searching {
                query: query.clone(),
            });
            let Some(position) = self.location.current_position() else {
                let failed = SearchState::Failed {
                    query,
                    reason: SearchError::LocationUnavailable,
                };
                inner.publish(failed.clone());
                return SubmitOutcome::Applied(failed);
            };
            (query, position.coordinate)
        };

        let destination = match self.geocoder.resolve(query.text(), Some(origin)).await {
            Ok(destination) => destination,
            Err(err) => {
                return self.apply(&query, None, |query| SearchState::Failed {
                    query,
                    reason: err.into(),
                });
            }
        };

        if self.is_stale(query.request_id()) {
            log::debug!("search {} superseded before routing", query.request_id());
            return SubmitOutcome::Superseded;
        }

        match self.router.route(origin, destination).await {
            Ok(route) => {
                let region = route.bounding_region();
                self.apply(&query, Some(region), |query| SearchState::Resolved {
                    query,
                    destination,
                    route,
                })
            }
            Err(err) => self.apply(&query, None, |query| SearchState::Failed {
                query,
                reason: err.into(),
            }),
        }
    }

    fn is_stale(&self, request: RequestId) -> bool {
        self.lock().latest != request
    }

    fn apply(
        &self,
        query: &SearchQuery,
        fit: Option<BoundingRegion>,
        build: impl FnOnce(SearchQuery) -> SearchState,
    ) -> SubmitOutcome {
        let mut inner = self.lock();
        if inner.latest != query.request_id() {
            log::debug!("discarding stale result for search {}", query.request_id());
            return SubmitOutcome::Superseded;
        }
        let state = build(query.clone());
        if let Some(region) = fit {
            inner.camera.fit(region);
        }
        inner.publish(state.clone());
        SubmitOutcome::Applied(state)
    }

    /// Return to [`SearchState::Idle`], invalidating any search in flight,
    /// and recenter on the user at the current zoom when a position is known.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.issue_request();
        inner.publish(SearchState::Idle);
        if let Some(position) = self.location.current_position() {
            let distance = inner.camera.state().distance();
            inner.camera.center_on(position.coordinate, distance, false);
        }
    }

    /// Apply the auto-center policy to a new position.
    ///
    /// The camera moves to the user once per orchestrator: on the first
    /// position seen while idle. Returns whether the camera moved.
    pub fn on_position(&self, position: &Position) -> bool {
        let mut inner = self.lock();
        if inner.auto_centered || inner.state != SearchState::Idle {
            return false;
        }
        inner.auto_centered = true;
        inner
            .camera
            .go_to_user(position.coordinate, self.config.default_distance, false);
        true
    }

    /// Feed location updates into [`Self::on_position`] until `updates` ends.
    /// Errors are logged and skipped.
    pub async fn follow<S>(&self, updates: S)
    where
        S: Stream<Item = Result<Position, LocationError>>,
    {
        let mut updates = pin!(updates);
        while let Some(update) = updates.next().await {
            match update {
                Ok(position) => {
                    self.on_position(&position);
                }
                Err(err) => log::warn!("location update failed: {err}"),
            }
        }
    }

    /// Zoom in by the configured factor.
    pub fn zoom_in(&self) {
        let factor = self.config.zoom_in_factor;
        self.lock().camera.zoom(factor);
    }

    /// Zoom out by the configured factor.
    pub fn zoom_out(&self) {
        let factor = self.config.zoom_out_factor;
        self.lock().camera.zoom(factor);
    }

    /// Move the camera to `point`, keeping the current zoom.
    pub fn pan_to(&self, point: Coordinate) {
        let mut inner = self.lock();
        let distance = inner.camera.state().distance();
        inner.camera.center_on(point, distance, false);
    }

    /// The "locate me" action. Returns `false` when no position is known.
    pub fn go_to_user(&self) -> bool {
        let Some(position) = self.location.current_position() else {
            return false;
        };
        let mut inner = self.lock();
        let route_shown = inner.state.shows_route();
        let distance = inner.camera.state().distance();
        inner
            .camera
            .go_to_user(position.coordinate, distance, route_shown);
        true
    }
}

impl<G, R, C> std::fmt::Debug for SearchOrchestrator<G, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SearchOrchestrator")
            .field("state", &inner.state)
            .field("latest", &inner.latest)
            .field("auto_centered", &inner.auto_centered)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
