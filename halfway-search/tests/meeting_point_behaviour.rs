//! End-to-end behaviour of the search engine against stub providers.

use halfway_core::geometry::haversine_meters;
use halfway_core::test_support::{
    FnMatrixProvider, StubGeocoder, StubRouteProvider, StubVenueProvider,
};
use halfway_core::{GeoPoint, SearchConfig, TransitRoute};
use halfway_search::{MeetingPointSearch, SearchError};
use rstest::{fixture, rstest};

const HOME: GeoPoint = GeoPoint::new(52.48, 13.35);
const WORK: GeoPoint = GeoPoint::new(52.54, 13.45);

#[fixture]
fn geocoder() -> StubGeocoder {
    StubGeocoder::new()
        .with_entry("Home", HOME)
        .with_entry("Work", WORK)
}

fn city_route() -> TransitRoute {
    let points: Vec<GeoPoint> = (0..=20)
        .map(|i| {
            let t = f64::from(i) / 20.0;
            GeoPoint::new(
                HOME.lat + (WORK.lat - HOME.lat) * t,
                HOME.lng + (WORK.lng - HOME.lng) * t,
            )
        })
        .collect();
    TransitRoute {
        points,
        distance_meters: 9000.0,
        duration_seconds: 1800.0,
        encoded_geometry: "stub-geometry".to_owned(),
    }
}

/// Transit times proportional to crow-flies distance, with one party
/// travelling at half the speed of the other.
fn asymmetric_transit() -> FnMatrixProvider {
    FnMatrixProvider::from_fn(|o, d| {
        let speed = if haversine_meters(o, HOME) < 1.0 { 2.5 } else { 5.0 };
        Some(haversine_meters(o, d) / speed)
    })
}

fn engine(
    geocoder: StubGeocoder,
    routes: StubRouteProvider,
    matrix: FnMatrixProvider,
) -> MeetingPointSearch<StubGeocoder, StubRouteProvider, FnMatrixProvider, StubVenueProvider> {
    MeetingPointSearch::new(
        geocoder,
        routes,
        matrix,
        StubVenueProvider::empty(),
        SearchConfig::default(),
    )
}

#[rstest]
#[tokio::test]
async fn slower_traveller_pulls_the_meeting_point_closer(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
    );
    let result = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("search succeeds");
    let metrics = result.metrics.expect("metrics present");
    // The slower party departs from Home, so the balanced point sits in the
    // first third of the route and the travel times are close.
    assert!(metrics.candidate.route_fraction < 0.45);
    assert!(metrics.time_difference_s < metrics.max_travel_time_s * 0.1);
}

#[rstest]
#[tokio::test]
async fn repeated_searches_give_the_same_answer(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
    );
    let first = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("first search");
    let second = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("second search");
    assert_eq!(first.meeting_point, second.meeting_point);
    assert_eq!(
        first.metrics.map(|m| m.max_travel_time_s),
        second.metrics.map(|m| m.max_travel_time_s)
    );
    assert_eq!(first.samples.len(), second.samples.len());
}

#[rstest]
#[tokio::test]
async fn chosen_point_beats_every_displayed_sample(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
    );
    let result = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("search succeeds");
    let best = result.metrics.expect("metrics present").max_travel_time_s;
    for sample in &result.samples {
        assert!(sample.max_travel_time_s >= best);
    }
}

#[rstest]
#[tokio::test]
async fn displayed_samples_keep_their_spacing(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
    );
    let config = SearchConfig::default();
    let result = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("search succeeds");
    for (i, a) in result.samples.iter().enumerate() {
        for b in result.samples.iter().skip(i + 1) {
            let along = (a.candidate.route_fraction - b.candidate.route_fraction).abs();
            let apart = haversine_meters(a.candidate.point, b.candidate.point);
            assert!(
                along > config.thinning.fraction_tolerance
                    && apart > config.thinning.min_spacing_m,
                "samples too close: {along} fraction, {apart} m"
            );
        }
    }
}

#[rstest]
#[tokio::test]
async fn no_route_means_midpoint_with_no_route_summary(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::without_route(),
        FnMatrixProvider::from_fn(|_, _| Some(900.0)),
    );
    let result = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("search succeeds");
    assert_eq!(result.meeting_point, Some(HOME.midpoint(WORK)));
    assert!(result.route.is_none());
    assert!(result.samples.is_empty());
}

#[rstest]
#[tokio::test]
async fn geocoding_failure_is_the_only_hard_error(geocoder: StubGeocoder) {
    let search = engine(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        FnMatrixProvider::all_absent(),
    );
    let err = search
        .find_meeting_point("Nowhere", "Work")
        .await
        .expect_err("unknown address");
    assert!(matches!(err, SearchError::UnresolvedAddress(_)));

    // With both addresses known, even a fully unreachable matrix degrades
    // to an empty result rather than an error.
    let result = search
        .find_meeting_point("Home", "Work")
        .await
        .expect("degraded search still succeeds");
    assert!(result.meeting_point.is_none());
    assert!(result.samples.is_empty());
}

#[cfg(feature = "surrogate")]
#[rstest]
#[tokio::test]
async fn surrogate_and_grid_paths_agree_on_the_neighbourhood(geocoder: StubGeocoder) {
    let surrogate = MeetingPointSearch::new(
        geocoder.clone(),
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
        StubVenueProvider::empty(),
        SearchConfig::default().with_surrogate(true),
    );
    let grid = MeetingPointSearch::new(
        geocoder,
        StubRouteProvider::with_route(city_route()),
        asymmetric_transit(),
        StubVenueProvider::empty(),
        SearchConfig::default().with_surrogate(false),
    );
    let a = surrogate
        .find_meeting_point("Home", "Work")
        .await
        .expect("surrogate search");
    let b = grid
        .find_meeting_point("Home", "Work")
        .await
        .expect("grid search");
    let fa = a.metrics.expect("surrogate metrics").candidate.route_fraction;
    let fb = b.metrics.expect("grid metrics").candidate.route_fraction;
    assert!((fa - fb).abs() < 0.05, "fractions diverge: {fa} vs {fb}");
}
