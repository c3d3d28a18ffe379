//! In-memory collaborators used by unit and behaviour tests.
//!
//! These doubles stand in for the platform location service, the geocoding
//! and routing providers, the place catalog and the map camera. They record
//! how they were called so tests can assert on interactions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::stream::{self, StreamExt};

use crate::{
    BoundingRegion, Camera, CatalogError, Coordinate, GeocodeResolver, GeocodingError,
    LocationError, LocationSource, PermissionState, Place, PlaceCatalog, Position, PositionFeed,
    RouteCalculator, RouteResult, RoutingError, TransportError, ViewportController,
    ViewportState,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted platform location service.
///
/// The scripted updates are delivered once, on the first call to
/// [`LocationSource::position_updates`].
#[derive(Debug)]
pub struct ScriptedLocationSource {
    permission: Mutex<PermissionState>,
    grant_on_request: bool,
    prompts: AtomicUsize,
    script: Mutex<Vec<Result<Position, LocationError>>>,
}

impl ScriptedLocationSource {
    /// A granted source that emits `positions` in order.
    pub fn granted<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        Self::scripted(positions.into_iter().map(Ok).collect())
    }

    /// A granted source that emits `script`, errors included.
    pub fn scripted(script: Vec<Result<Position, LocationError>>) -> Self {
        Self {
            permission: Mutex::new(PermissionState::Granted),
            grant_on_request: false,
            prompts: AtomicUsize::new(0),
            script: Mutex::new(script),
        }
    }

    /// A source with no updates and the given permission.
    pub fn with_permission(permission: PermissionState) -> Self {
        Self::scripted(Vec::new()).starting_as(permission)
    }

    /// Override the initial permission.
    #[must_use]
    pub fn starting_as(self, permission: PermissionState) -> Self {
        *lock(&self.permission) = permission;
        self
    }

    /// Answer the permission prompt with "allow" immediately.
    #[must_use]
    pub fn granting_on_request(mut self) -> Self {
        self.grant_on_request = true;
        self
    }

    /// Simulate the user answering the prompt or changing settings.
    pub fn set_permission(&self, permission: PermissionState) {
        *lock(&self.permission) = permission;
    }

    /// Number of permission prompts shown.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl LocationSource for ScriptedLocationSource {
    fn permission_state(&self) -> PermissionState {
        *lock(&self.permission)
    }

    fn request_permission(&self) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request {
            self.set_permission(PermissionState::Granted);
        }
    }

    fn position_updates(&self) -> PositionFeed {
        let script = std::mem::take(&mut *lock(&self.script));
        stream::iter(script).boxed()
    }
}

/// Geocoder answering from a fixed table. Unknown queries are `NotFound`.
#[derive(Debug, Default)]
pub struct StubGeocoder {
    answers: HashMap<String, Result<Coordinate, GeocodingError>>,
    calls: AtomicUsize,
    biases: Mutex<Vec<Option<Coordinate>>>,
}

impl StubGeocoder {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `query` to `coordinate`.
    #[must_use]
    pub fn with_answer(mut self, query: &str, coordinate: Coordinate) -> Self {
        self.answers.insert(query.to_owned(), Ok(coordinate));
        self
    }

    /// Fail `query` with `error`.
    #[must_use]
    pub fn with_error(mut self, query: &str, error: GeocodingError) -> Self {
        self.answers.insert(query.to_owned(), Err(error));
        self
    }

    /// Number of resolve calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Bias passed to each call, in order.
    pub fn biases(&self) -> Vec<Option<Coordinate>> {
        lock(&self.biases).clone()
    }
}

#[async_trait]
impl GeocodeResolver for StubGeocoder {
    async fn resolve(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.biases).push(bias);
        self.answers
            .get(query)
            .cloned()
            .unwrap_or_else(|| {
                Err(GeocodingError::NotFound {
                    query: query.to_owned(),
                })
            })
    }
}

/// Geocoder whose answers are released by the test, one query at a time.
///
/// Register a gate with [`GatedGeocoder::gate`] before submitting; the
/// returned sender completes the pending `resolve` call. Dropping the sender
/// fails the call as unavailable.
#[derive(Debug, Default)]
pub struct GatedGeocoder {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<Coordinate, GeocodingError>>>>,
}

/// Releases one pending [`GatedGeocoder`] answer.
pub type GeocodeGate = oneshot::Sender<Result<Coordinate, GeocodingError>>;

impl GatedGeocoder {
    /// No gates registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the answer for `query` until the returned sender fires.
    pub fn gate(&self, query: &str) -> GeocodeGate {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(query.to_owned(), rx);
        tx
    }
}

#[async_trait]
impl GeocodeResolver for GatedGeocoder {
    async fn resolve(
        &self,
        query: &str,
        _bias: Option<Coordinate>,
    ) -> Result<Coordinate, GeocodingError> {
        let gate = lock(&self.gates).remove(query);
        let Some(gate) = gate else {
            return Err(GeocodingError::NotFound {
                query: query.to_owned(),
            });
        };
        gate.await.unwrap_or_else(|_| {
            Err(GeocodingError::Unavailable(TransportError::NetworkError {
                url: format!("gate://{query}"),
                message: "gate dropped".to_owned(),
            }))
        })
    }
}

/// Route calculator returning one fixed outcome.
#[derive(Debug)]
pub struct StubRouteCalculator {
    outcome: Result<RouteResult, RoutingError>,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl StubRouteCalculator {
    /// Always return `route`.
    pub fn with_route(route: RouteResult) -> Self {
        Self {
            outcome: Ok(route),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn with_error(error: RoutingError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of route calls.
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// `(from, to)` pairs requested, in order.
    pub fn requests(&self) -> Vec<(Coordinate, Coordinate)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl RouteCalculator for StubRouteCalculator {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError> {
        lock(&self.requests).push((from, to));
        self.outcome.clone()
    }
}

/// Releases one pending [`GatedRouteCalculator`] answer.
pub type RouteGate = oneshot::Sender<Result<RouteResult, RoutingError>>;

/// Route calculator whose answers are released by the test, one destination
/// at a time.
///
/// Routes to a destination without a registered gate fail with
/// [`RoutingError::NoRoute`]; dropping a sender fails the call as
/// unavailable.
#[derive(Debug, Default)]
pub struct GatedRouteCalculator {
    gates: Mutex<Vec<(Coordinate, oneshot::Receiver<Result<RouteResult, RoutingError>>)>>,
}

impl GatedRouteCalculator {
    /// No gates registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the route to `destination` until the returned sender fires.
    pub fn gate(&self, destination: Coordinate) -> RouteGate {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).push((destination, rx));
        tx
    }
}

#[async_trait]
impl RouteCalculator for GatedRouteCalculator {
    async fn route(&self, _from: Coordinate, to: Coordinate) -> Result<RouteResult, RoutingError> {
        let gate = {
            let mut gates = lock(&self.gates);
            gates
                .iter()
                .position(|(destination, _)| *destination == to)
                .map(|index| gates.remove(index).1)
        };
        let Some(gate) = gate else {
            return Err(RoutingError::NoRoute);
        };
        gate.await.unwrap_or_else(|_| {
            Err(RoutingError::Unavailable(TransportError::NetworkError {
                url: format!("gate://{},{}", to.latitude(), to.longitude()),
                message: "gate dropped".to_owned(),
            }))
        })
    }
}

/// A camera operation as requested by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    /// [`Camera::center_on`].
    CenterOn {
        /// Requested center.
        point: Coordinate,
        /// Requested distance.
        distance: f64,
        /// Requested follow flag.
        follows_user: bool,
    },
    /// [`Camera::zoom`].
    Zoom(f64),
    /// [`Camera::fit`].
    Fit(BoundingRegion),
    /// [`Camera::go_to_user`].
    GoToUser {
        /// User position.
        point: Coordinate,
        /// Requested distance.
        distance: f64,
        /// Whether a route was shown.
        route_shown: bool,
    },
}

/// Shared log of [`CameraCall`]s, readable after the camera moves into an
/// orchestrator.
#[derive(Debug, Clone, Default)]
pub struct CameraLog(Arc<Mutex<Vec<CameraCall>>>);

impl CameraLog {
    /// Every call so far.
    pub fn calls(&self) -> Vec<CameraCall> {
        lock(&self.0).clone()
    }

    /// Regions passed to `fit`.
    pub fn fits(&self) -> Vec<BoundingRegion> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CameraCall::Fit(region) => Some(region),
                _ => None,
            })
            .collect()
    }

    /// Number of calls that moved the camera onto the user.
    pub fn user_centerings(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, CameraCall::GoToUser { .. }))
            .count()
    }

    fn push(&self, call: CameraCall) {
        lock(&self.0).push(call);
    }
}

/// [`ViewportController`] that records every request.
#[derive(Debug)]
pub struct RecordingCamera {
    inner: ViewportController,
    log: CameraLog,
}

impl RecordingCamera {
    /// A recording camera at `center`.
    pub fn new(center: Coordinate, distance: f64) -> Self {
        Self {
            inner: ViewportController::new(center, distance),
            log: CameraLog::default(),
        }
    }

    /// Handle on the call log.
    pub fn log(&self) -> CameraLog {
        self.log.clone()
    }
}

impl Camera for RecordingCamera {
    fn center_on(&mut self, point: Coordinate, distance: f64, follows_user: bool) {
        self.log.push(CameraCall::CenterOn {
            point,
            distance,
            follows_user,
        });
        self.inner.center_on(point, distance, follows_user);
    }

    fn zoom(&mut self, factor: f64) {
        self.log.push(CameraCall::Zoom(factor));
        self.inner.zoom(factor);
    }

    fn fit(&mut self, region: BoundingRegion) {
        self.log.push(CameraCall::Fit(region));
        self.inner.fit(region);
    }

    fn go_to_user(&mut self, point: Coordinate, distance: f64, route_shown: bool) {
        self.log.push(CameraCall::GoToUser {
            point,
            distance,
            route_shown,
        });
        self.inner.go_to_user(point, distance, route_shown);
    }

    fn state(&self) -> ViewportState {
        self.inner.state()
    }
}

/// In-memory [`PlaceCatalog`].
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    places: Vec<Place>,
}

impl MemoryCatalog {
    /// A catalog listing `places` in order.
    pub fn with_places<I>(places: I) -> Self
    where
        I: IntoIterator<Item = Place>,
    {
        Self {
            places: places.into_iter().collect(),
        }
    }
}

impl PlaceCatalog for MemoryCatalog {
    fn fetch_nearby_places(&self) -> Result<Vec<Place>, CatalogError> {
        Ok(self.places.clone())
    }
}
