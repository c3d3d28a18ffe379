//! Unit tests for the search orchestrator.

use std::sync::Arc;

use futures::StreamExt;
use futures::executor::block_on;
use rstest::{fixture, rstest};

use super::*;
use crate::test_support::{
    CameraCall, CameraLog, GatedGeocoder, GatedRouteCalculator, RecordingCamera,
    ScriptedLocationSource, StubGeocoder, StubRouteCalculator,
};
use crate::{
    Coordinate, GeocodingError, LocationError, LocationHandle, LocationStream, Position,
    RouteResult, RoutingError, TransportError,
};

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid coordinate")
}

fn handle_at(point: Option<Coordinate>) -> LocationHandle {
    let positions: Vec<Position> = point.into_iter().map(Position::at).collect();
    let stream = LocationStream::new(ScriptedLocationSource::granted(positions));
    let updates = stream.start().expect("permission granted");
    block_on(updates.collect::<Vec<_>>());
    stream.handle()
}

#[fixture]
fn origin() -> Coordinate {
    coord(45.4972, -73.5790)
}

#[fixture]
fn mcgill() -> Coordinate {
    coord(45.5048, -73.5772)
}

#[fixture]
fn route(origin: Coordinate, mcgill: Coordinate) -> RouteResult {
    RouteResult::from_polyline(
        vec![origin, coord(45.5010, -73.5781), mcgill],
        1_250.0,
        240.0,
    )
    .expect("valid route")
}

type Recorded<G> = SearchOrchestrator<G, Arc<StubRouteCalculator>, RecordingCamera>;

fn recorded<G: crate::GeocodeResolver>(
    geocoder: G,
    router: Arc<StubRouteCalculator>,
    location: LocationHandle,
) -> (Recorded<G>, CameraLog) {
    let config = OrchestratorConfig::default();
    let camera = RecordingCamera::new(config.fallback_center, config.default_distance);
    let log = camera.log();
    (
        SearchOrchestrator::with_camera(geocoder, router, location, config, camera),
        log,
    )
}

const fn phase(state: &SearchState) -> &'static str {
    match state {
        SearchState::Idle => "idle",
        SearchState::Searching { .. } => "searching",
        SearchState::Resolved { .. } => "resolved",
        SearchState::Failed { .. } => "failed",
    }
}

fn published<G, R, C>(orchestrator: SearchOrchestrator<G, R, C>, states: StateUpdates) -> Vec<SearchState> {
    drop(orchestrator);
    block_on(states.collect())
}

#[rstest]
fn resolves_destination_and_fits_route(origin: Coordinate, mcgill: Coordinate, route: RouteResult) {
    let geocoder = Arc::new(StubGeocoder::new().with_answer("McGill University", mcgill));
    let router = Arc::new(StubRouteCalculator::with_route(route.clone()));
    let (orchestrator, log) = recorded(Arc::clone(&geocoder), Arc::clone(&router), handle_at(Some(origin)));
    let states = orchestrator.subscribe();

    let outcome = block_on(orchestrator.submit("McGill University"));

    let (destination, shown) = match outcome {
        SubmitOutcome::Applied(SearchState::Resolved {
            destination, route, ..
        }) => (destination, route),
        other => panic!("expected a resolved search, got {other:?}"),
    };
    assert_eq!(destination, mcgill);
    assert_eq!(shown, route);
    assert_eq!(log.fits(), vec![route.bounding_region()]);
    assert_eq!(geocoder.biases(), vec![Some(origin)]);
    assert_eq!(router.requests(), vec![(origin, mcgill)]);

    let phases: Vec<_> = published(orchestrator, states).iter().map(phase).collect();
    assert_eq!(phases, ["idle", "searching", "resolved"]);
}

#[rstest]
fn missing_location_short_circuits(route: RouteResult) {
    let geocoder = Arc::new(StubGeocoder::new());
    let router = Arc::new(StubRouteCalculator::with_route(route));
    let orchestrator =
        SearchOrchestrator::new(Arc::clone(&geocoder), Arc::clone(&router), handle_at(None));

    let outcome = block_on(orchestrator.submit("McGill University"));

    assert_eq!(
        orchestrator.state().error_kind(),
        Some(ErrorKind::LocationUnavailable)
    );
    assert!(matches!(outcome, SubmitOutcome::Applied(SearchState::Failed { .. })));
    assert_eq!(geocoder.calls(), 0);
    assert_eq!(router.calls(), 0);
}

#[rstest]
fn not_found_skips_routing(origin: Coordinate, route: RouteResult) {
    let geocoder = StubGeocoder::new();
    let router = Arc::new(StubRouteCalculator::with_route(route));
    let (orchestrator, log) = recorded(geocoder, Arc::clone(&router), handle_at(Some(origin)));

    block_on(orchestrator.submit("zzzqqq-nonexistent"));

    assert_eq!(
        orchestrator.state(),
        SearchState::Failed {
            query: SearchQuery::new("zzzqqq-nonexistent", RequestId::default().next())
                .expect("query"),
            reason: SearchError::NotFound {
                query: "zzzqqq-nonexistent".into()
            },
        }
    );
    assert_eq!(router.calls(), 0);
    assert!(log.fits().is_empty());
}

#[rstest]
#[case::no_route(RoutingError::NoRoute, ErrorKind::NoRoute)]
#[case::transport(
    RoutingError::Unavailable(TransportError::HttpError {
        url: "http://osrm/route".into(),
        status: 503,
        message: "busy".into(),
    }),
    ErrorKind::Unavailable
)]
fn route_failure_keeps_no_destination(
    origin: Coordinate,
    mcgill: Coordinate,
    #[case] error: RoutingError,
    #[case] kind: ErrorKind,
) {
    let geocoder = StubGeocoder::new().with_answer("McGill University", mcgill);
    let router = Arc::new(StubRouteCalculator::with_error(error));
    let (orchestrator, log) = recorded(geocoder, router, handle_at(Some(origin)));

    block_on(orchestrator.submit("McGill University"));

    let state = orchestrator.state();
    assert_eq!(state.error_kind(), Some(kind));
    assert!(!state.shows_route());
    assert!(log.fits().is_empty());
}

#[rstest]
fn geocoder_outage_is_unavailable(origin: Coordinate, route: RouteResult) {
    let geocoder = StubGeocoder::new().with_error(
        "McGill University",
        GeocodingError::Unavailable(TransportError::Timeout {
            url: "http://nominatim/search".into(),
            timeout_secs: 30,
        }),
    );
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );

    block_on(orchestrator.submit("McGill University"));

    assert_eq!(orchestrator.state().error_kind(), Some(ErrorKind::Unavailable));
}

#[rstest]
#[case::newer_success(Ok(coord(45.5088, -73.5878)))]
#[case::newer_failure(Err(GeocodingError::NotFound { query: "B".into() }))]
#[tokio::test]
async fn earlier_answer_arriving_last_is_discarded(
    origin: Coordinate,
    route: RouteResult,
    #[case] answer_b: Result<Coordinate, GeocodingError>,
) {
    let geocoder = GatedGeocoder::new();
    let gate_a = geocoder.gate("A");
    let gate_b = geocoder.gate("B");
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );
    let states = orchestrator.subscribe();

    let (a, b, ()) = tokio::join!(
        orchestrator.submit("A"),
        orchestrator.submit("B"),
        async {
            tokio::task::yield_now().await;
            gate_b.send(answer_b).expect("B is pending");
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            gate_a.send(Ok(coord(45.5017, -73.5673))).expect("A is pending");
        }
    );

    assert_eq!(a, SubmitOutcome::Superseded);
    let final_state = match b {
        SubmitOutcome::Applied(state) => state,
        other => panic!("B should apply, got {other:?}"),
    };
    assert_eq!(orchestrator.state(), final_state);
    assert_eq!(final_state.query().map(SearchQuery::text), Some("B"));

    let history = published(orchestrator, states);
    let a_terminal = history.iter().any(|s| {
        s.query().is_some_and(|q| q.text() == "A")
            && !matches!(s, SearchState::Searching { .. })
    });
    assert!(!a_terminal, "A's outcome leaked into {history:?}");
}

#[rstest]
#[case::both_routes_found(true, true)]
#[case::older_route_fails(false, true)]
#[case::newer_route_fails(true, false)]
#[tokio::test]
async fn earlier_route_arriving_last_is_discarded(
    origin: Coordinate,
    #[case] a_routes: bool,
    #[case] b_routes: bool,
) {
    let dest_a = coord(45.5017, -73.5673);
    let dest_b = coord(45.5100, -73.5900);
    let route_a = RouteResult::from_polyline(vec![origin, dest_a], 900.0, 180.0)
        .expect("valid route");
    let route_b = RouteResult::from_polyline(vec![origin, dest_b], 1_600.0, 300.0)
        .expect("valid route");
    let answer = |found: bool, route: &RouteResult| {
        if found {
            Ok(route.clone())
        } else {
            Err(RoutingError::NoRoute)
        }
    };

    let router = GatedRouteCalculator::new();
    let gate_a = router.gate(dest_a);
    let gate_b = router.gate(dest_b);
    let geocoder = StubGeocoder::new()
        .with_answer("A", dest_a)
        .with_answer("B", dest_b);
    let config = OrchestratorConfig::default();
    let camera = RecordingCamera::new(config.fallback_center, config.default_distance);
    let log = camera.log();
    let orchestrator =
        SearchOrchestrator::with_camera(geocoder, router, handle_at(Some(origin)), config, camera);

    let (a, b, ()) = tokio::join!(
        orchestrator.submit("A"),
        orchestrator.submit("B"),
        async {
            tokio::task::yield_now().await;
            gate_b.send(answer(b_routes, &route_b)).expect("B is routing");
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            gate_a.send(answer(a_routes, &route_a)).expect("A is routing");
        }
    );

    assert_eq!(a, SubmitOutcome::Superseded);
    let final_state = match b {
        SubmitOutcome::Applied(state) => state,
        other => panic!("B should apply, got {other:?}"),
    };
    assert_eq!(orchestrator.state(), final_state);
    assert_eq!(final_state.query().map(SearchQuery::text), Some("B"));
    assert_eq!(matches!(final_state, SearchState::Resolved { .. }), b_routes);

    let expected_fits = if b_routes {
        vec![route_b.bounding_region()]
    } else {
        Vec::new()
    };
    assert_eq!(log.fits(), expected_fits);
}

#[rstest]
#[tokio::test]
async fn stale_geocode_never_reaches_routing(origin: Coordinate, route: RouteResult) {
    let geocoder = GatedGeocoder::new();
    let gate_a = geocoder.gate("A");
    let router = Arc::new(StubRouteCalculator::with_route(route));
    let orchestrator =
        SearchOrchestrator::new(geocoder, Arc::clone(&router), handle_at(Some(origin)));

    let (a, ()) = tokio::join!(orchestrator.submit("A"), async {
        tokio::task::yield_now().await;
        orchestrator.clear();
        gate_a.send(Ok(coord(45.5017, -73.5673))).expect("A is pending");
    });

    assert_eq!(a, SubmitOutcome::Superseded);
    assert_eq!(orchestrator.state(), SearchState::Idle);
    assert_eq!(router.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn blank_submit_does_not_cancel_search(origin: Coordinate, mcgill: Coordinate, route: RouteResult) {
    let geocoder = GatedGeocoder::new();
    let gate = geocoder.gate("McGill University");
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );

    let (first, blank, ()) = tokio::join!(
        orchestrator.submit("McGill University"),
        orchestrator.submit("   "),
        async {
            tokio::task::yield_now().await;
            gate.send(Ok(mcgill)).expect("search is pending");
        }
    );

    assert_eq!(blank, SubmitOutcome::Ignored);
    assert!(matches!(first, SubmitOutcome::Applied(SearchState::Resolved { .. })));
}

#[rstest]
fn clear_then_resubmit_reproduces_result(origin: Coordinate, mcgill: Coordinate, route: RouteResult) {
    let geocoder = StubGeocoder::new().with_answer("McGill University", mcgill);
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );

    block_on(orchestrator.submit("McGill University"));
    let first = orchestrator.state();
    orchestrator.clear();
    assert_eq!(orchestrator.state(), SearchState::Idle);
    block_on(orchestrator.submit("McGill University"));
    let second = orchestrator.state();

    match (first, second) {
        (
            SearchState::Resolved {
                destination: d1,
                route: r1,
                query: q1,
            },
            SearchState::Resolved {
                destination: d2,
                route: r2,
                query: q2,
            },
        ) => {
            assert_eq!((d1, r1), (d2, r2));
            assert_eq!(q1.text(), q2.text());
            assert!(q2.request_id() > q1.request_id());
        }
        other => panic!("expected two resolved states, got {other:?}"),
    }
}

#[rstest]
fn clear_recenters_on_user_at_current_zoom(origin: Coordinate, mcgill: Coordinate, route: RouteResult) {
    let geocoder = StubGeocoder::new().with_answer("McGill University", mcgill);
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );
    block_on(orchestrator.submit("McGill University"));
    orchestrator.zoom_out();
    let distance = orchestrator.viewport().distance();

    orchestrator.clear();

    let viewport = orchestrator.viewport();
    assert_eq!(viewport.center, origin);
    assert!((viewport.distance() - distance).abs() < 1e-6);
    assert!(!viewport.follows_user);
}

#[rstest]
fn auto_centers_once(route: RouteResult) {
    let positions = [
        coord(45.5000, -73.5700),
        coord(45.5010, -73.5710),
        coord(45.5020, -73.5720),
    ];
    let stream = LocationStream::new(ScriptedLocationSource::granted(
        positions.map(Position::at),
    ));
    let (orchestrator, log) = recorded(
        StubGeocoder::new(),
        Arc::new(StubRouteCalculator::with_route(route)),
        stream.handle(),
    );

    block_on(orchestrator.follow(stream.start().expect("permission granted")));

    assert_eq!(log.user_centerings(), 1);
    assert_eq!(
        log.calls(),
        vec![CameraCall::GoToUser {
            point: positions[0],
            distance: 2_000.0,
            route_shown: false,
        }]
    );
    assert!(orchestrator.viewport().follows_user);
}

#[rstest]
fn location_errors_do_not_stop_following(origin: Coordinate, route: RouteResult) {
    let stream = LocationStream::new(ScriptedLocationSource::scripted(vec![
        Err(LocationError::Source {
            message: "denied temporarily".into(),
        }),
        Ok(Position::at(origin)),
    ]));
    let orchestrator = SearchOrchestrator::new(
        StubGeocoder::new(),
        StubRouteCalculator::with_route(route),
        stream.handle(),
    );

    block_on(orchestrator.follow(stream.start().expect("permission granted")));

    assert_eq!(orchestrator.viewport().center, origin);
}

#[rstest]
fn no_auto_center_while_searching(origin: Coordinate, route: RouteResult) {
    let (orchestrator, log) = recorded(
        StubGeocoder::new(),
        Arc::new(StubRouteCalculator::with_route(route)),
        handle_at(Some(origin)),
    );
    block_on(orchestrator.submit("zzzqqq-nonexistent"));

    assert!(!orchestrator.on_position(&Position::at(origin)));
    orchestrator.clear();
    assert!(orchestrator.on_position(&Position::at(origin)));
    assert!(!orchestrator.on_position(&Position::at(origin)));
    assert_eq!(log.user_centerings(), 1);
}

#[rstest]
#[case::without_route(false, true)]
#[case::with_route(true, false)]
fn go_to_user_follows_only_without_route(
    origin: Coordinate,
    mcgill: Coordinate,
    route: RouteResult,
    #[case] search_first: bool,
    #[case] follows: bool,
) {
    let geocoder = StubGeocoder::new().with_answer("McGill University", mcgill);
    let orchestrator = SearchOrchestrator::new(
        geocoder,
        StubRouteCalculator::with_route(route),
        handle_at(Some(origin)),
    );
    if search_first {
        block_on(orchestrator.submit("McGill University"));
    }
    orchestrator.pan_to(mcgill);
    assert!(!orchestrator.viewport().follows_user);

    assert!(orchestrator.go_to_user());

    assert_eq!(orchestrator.viewport().center, origin);
    assert_eq!(orchestrator.viewport().follows_user, follows);
}

#[rstest]
fn go_to_user_without_position_is_refused(route: RouteResult) {
    let orchestrator = SearchOrchestrator::new(
        StubGeocoder::new(),
        StubRouteCalculator::with_route(route),
        handle_at(None),
    );
    assert!(!orchestrator.go_to_user());
    assert_eq!(orchestrator.viewport().center, FALLBACK_CENTER);
}

#[rstest]
fn zoom_uses_configured_factors(route: RouteResult) {
    let orchestrator = SearchOrchestrator::new(
        StubGeocoder::new(),
        StubRouteCalculator::with_route(route),
        handle_at(None),
    );
    orchestrator.zoom_in();
    assert!((orchestrator.viewport().distance() - 1_600.0).abs() < 1e-9);
    orchestrator.zoom_out();
    assert!((orchestrator.viewport().distance() - 1_920.0).abs() < 1e-9);
}

#[rstest]
fn zoom_is_forwarded_to_camera(route: RouteResult) {
    let (orchestrator, log) = recorded(
        StubGeocoder::new(),
        Arc::new(StubRouteCalculator::with_route(route)),
        handle_at(None),
    );
    orchestrator.zoom_in();
    orchestrator.zoom_out();
    assert_eq!(
        log.calls(),
        vec![CameraCall::Zoom(0.8), CameraCall::Zoom(1.2)]
    );
}
