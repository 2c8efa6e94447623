//! Global-then-local orchestration of a meeting-point search.

use futures_util::join;
use halfway_core::{
    Candidate, DurationMatrixProvider, Evaluation, GeoPoint, GeocodedAddress, Geocoder,
    ProviderError, RouteGeometry, RouteProvider, SearchConfig, TransitRoute, VenueProvider,
};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::candidates::generate_global_candidates;
use crate::evaluate::TravelTimeEvaluator;
use crate::pool::EvaluationPool;
use crate::thin::thin_for_display;
use crate::venue::{RankedVenue, VenueScoring, rank_venues};

/// Errors that fail a search outright.
///
/// Only geocoding can fail a search; every provider problem after both
/// origins have resolved degrades to a fallback path instead.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The geocoder answered but could not resolve the address.
    #[error("address could not be resolved: {0}")]
    UnresolvedAddress(String),
    /// The geocoding call itself failed.
    #[error("geocoding failed for {address}")]
    Geocoding {
        /// The address being resolved.
        address: String,
        /// The underlying provider failure.
        source: ProviderError,
    },
}

/// Transit times from each origin to the chosen meeting point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelTimes {
    /// Seconds from the first origin.
    pub from_origin1_s: f64,
    /// Seconds from the second origin.
    pub from_origin2_s: f64,
}

/// Display payload for the route between the origins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    /// Total route distance in metres.
    pub distance_meters: f64,
    /// Total transit duration in seconds.
    pub duration_seconds: f64,
    /// Compact encoded polyline of the route geometry.
    pub encoded_geometry: String,
}

impl RouteSummary {
    fn from_route(route: &TransitRoute) -> Self {
        Self {
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
            encoded_geometry: route.encoded_geometry.clone(),
        }
    }
}

/// Everything a search produces.
///
/// `meeting_point` is `None` only when no candidate at all could be
/// evaluated; the geocoded origins are always present.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingPointResult {
    /// The first resolved origin.
    pub origin1: GeocodedAddress,
    /// The second resolved origin.
    pub origin2: GeocodedAddress,
    /// The chosen meeting point.
    pub meeting_point: Option<GeoPoint>,
    /// Full travel-time metrics for the chosen point.
    pub metrics: Option<Evaluation>,
    /// Travel times to the chosen point, for display.
    pub travel_times: Option<TravelTimes>,
    /// The transit route between the origins, when one was found.
    pub route: Option<RouteSummary>,
    /// Thinned evaluation samples for map display, best first.
    pub samples: Vec<Evaluation>,
    /// The best-ranked venue near the meeting point.
    pub best_venue: Option<RankedVenue>,
    /// Runner-up venues, best first.
    pub venue_alternatives: Vec<RankedVenue>,
}

/// The meeting-point search engine, generic over its four providers.
///
/// # Examples
/// ```
/// use halfway_core::test_support::{
///     FnMatrixProvider, StubGeocoder, StubRouteProvider, StubVenueProvider,
/// };
/// use halfway_core::{GeoPoint, SearchConfig};
/// use halfway_search::MeetingPointSearch;
///
/// # async fn demo() -> Result<(), halfway_search::SearchError> {
/// let search = MeetingPointSearch::new(
///     StubGeocoder::new()
///         .with_entry("A", GeoPoint::new(0.0, 0.0))
///         .with_entry("B", GeoPoint::new(0.0, 1.0)),
///     StubRouteProvider::without_route(),
///     FnMatrixProvider::from_fn(|_, _| Some(600.0)),
///     StubVenueProvider::empty(),
///     SearchConfig::default(),
/// );
/// let result = search.find_meeting_point("A", "B").await?;
/// assert!(result.meeting_point.is_some());
/// # Ok(())
/// # }
/// ```
pub struct MeetingPointSearch<G, R, M, V> {
    geocoder: G,
    routes: R,
    matrix: M,
    venues: V,
    config: SearchConfig,
}

impl<G, R, M, V> MeetingPointSearch<G, R, M, V>
where
    G: Geocoder + Sync,
    R: RouteProvider + Sync,
    M: DurationMatrixProvider + Sync,
    V: VenueProvider + Sync,
{
    /// Assemble the engine from its providers and configuration.
    #[must_use]
    pub fn new(geocoder: G, routes: R, matrix: M, venues: V, config: SearchConfig) -> Self {
        Self {
            geocoder,
            routes,
            matrix,
            venues,
            config,
        }
    }

    /// The configuration this engine searches with.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the fairest meeting point between two addresses.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when either address cannot be geocoded.
    /// Later provider failures degrade: a missing route falls back to the
    /// arithmetic midpoint, unreachable candidates are skipped, and venue
    /// lookup failures leave the venue fields empty.
    pub async fn find_meeting_point(
        &self,
        address1: &str,
        address2: &str,
    ) -> Result<MeetingPointResult, SearchError> {
        let (first, second) = join!(self.geocode(address1), self.geocode(address2));
        let origin1 = first?;
        let origin2 = second?;

        let route = match self
            .routes
            .fastest_transit_route(origin1.location, origin2.location)
            .await
        {
            Ok(route) => route,
            Err(err) => {
                warn!("route lookup failed, falling back to midpoint: {err}");
                None
            }
        };
        let route = route.filter(|r| !r.points.is_empty());

        let Some(route) = route else {
            return Ok(self.midpoint_fallback(origin1, origin2).await);
        };

        let geometry = RouteGeometry::from_route(&route);
        let pool = self
            .search_route(&geometry, origin1.location, origin2.location)
            .await;

        let best = pool.best().copied();
        let meeting_point = best.map(|e| e.candidate.point);
        let travel_times = best.map(|e| TravelTimes {
            from_origin1_s: e.time_from_origin1_s,
            from_origin2_s: e.time_from_origin2_s,
        });
        let samples = thin_for_display(pool.evaluations(), &self.config.thinning);
        info!(
            "searched {} candidates, kept {} for display",
            pool.len(),
            samples.len()
        );
        let (best_venue, venue_alternatives) = match meeting_point {
            Some(point) => {
                self.rank_nearby_venues(
                    point,
                    origin1.location,
                    origin2.location,
                    VenueScoring::Minimax,
                )
                .await
            }
            None => (None, Vec::new()),
        };

        Ok(MeetingPointResult {
            origin1,
            origin2,
            meeting_point,
            metrics: best,
            travel_times,
            route: Some(RouteSummary::from_route(&route)),
            samples,
            best_venue,
            venue_alternatives,
        })
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, SearchError> {
        self.geocoder
            .geocode(address)
            .await
            .map_err(|source| SearchError::Geocoding {
                address: address.to_owned(),
                source,
            })?
            .ok_or_else(|| SearchError::UnresolvedAddress(address.to_owned()))
    }

    /// Search the route for the lowest-minimax point.
    ///
    /// With the Gaussian-process searcher compiled in and enabled this is a
    /// global sweep followed by local refinement around the most promising
    /// fractions. Without it the whole route goes through one deterministic
    /// coarse-to-fine pass instead. Degenerate single-point routes evaluate
    /// their sole candidate either way.
    async fn search_route(
        &self,
        geometry: &RouteGeometry,
        origin1: GeoPoint,
        origin2: GeoPoint,
    ) -> EvaluationPool {
        let evaluator = TravelTimeEvaluator::new(&self.matrix, &self.config);
        let mut pool = EvaluationPool::new();

        if geometry.is_degenerate() {
            let sweep = generate_global_candidates(geometry, &self.config);
            pool.extend(evaluator.evaluate(origin1, origin2, &sweep).await);
            return pool;
        }

        #[cfg(feature = "surrogate")]
        if self.config.use_surrogate {
            return self
                .surrogate_search(&evaluator, geometry, origin1, origin2)
                .await;
        }

        let outcome = crate::grid::coarse_to_fine_search(
            &evaluator,
            geometry,
            origin1,
            origin2,
            0.0,
            1.0,
            &self.config,
        )
        .await;
        pool.extend(outcome.evaluations);
        pool
    }

    /// Global sweep, then Bayesian refinement around the most promising
    /// fractions, all accumulating into one pool.
    #[cfg(feature = "surrogate")]
    async fn surrogate_search(
        &self,
        evaluator: &TravelTimeEvaluator<'_, M>,
        geometry: &RouteGeometry,
        origin1: GeoPoint,
        origin2: GeoPoint,
    ) -> EvaluationPool {
        let mut pool = EvaluationPool::new();
        let sweep = generate_global_candidates(geometry, &self.config);
        pool.extend(evaluator.evaluate(origin1, origin2, &sweep).await);

        for center in self.refinement_seeds(&pool) {
            let searcher = crate::bayes::BayesianSearcher::new(
                evaluator, geometry, origin1, origin2, &self.config,
            );
            searcher.refine_around(center, &mut pool).await;
        }
        pool
    }

    /// The top-ranked on-route fractions, separated enough that their
    /// refinement windows do not collapse onto each other.
    #[cfg(feature = "surrogate")]
    fn refinement_seeds(&self, pool: &EvaluationPool) -> Vec<f64> {
        let mut seeds: Vec<f64> = Vec::new();
        for evaluation in pool.sorted_by_objective() {
            if seeds.len() == self.config.top_k_refine {
                break;
            }
            let fraction = evaluation.candidate.route_fraction;
            let separated = seeds
                .iter()
                .all(|&s| (s - fraction).abs() >= self.config.local_window_half_width);
            if separated {
                seeds.push(fraction);
            }
        }
        seeds
    }

    /// No transit route between the origins: meet at the arithmetic
    /// midpoint and report whatever travel times resolve.
    async fn midpoint_fallback(
        &self,
        origin1: GeocodedAddress,
        origin2: GeocodedAddress,
    ) -> MeetingPointResult {
        let midpoint = origin1.location.midpoint(origin2.location);
        let (first, second) = join!(
            self.matrix.duration(origin1.location, midpoint),
            self.matrix.duration(origin2.location, midpoint)
        );
        let t1 = first.unwrap_or_else(|err| {
            warn!("midpoint duration lookup failed: {err}");
            None
        });
        let t2 = second.unwrap_or_else(|err| {
            warn!("midpoint duration lookup failed: {err}");
            None
        });
        let metrics = t1.zip(t2).map(|(t1, t2)| {
            Evaluation::new(Candidate::on_route(midpoint, 0.5), t1, t2)
        });
        let travel_times = t1.zip(t2).map(|(t1, t2)| TravelTimes {
            from_origin1_s: t1,
            from_origin2_s: t2,
        });
        let (best_venue, venue_alternatives) = self
            .rank_nearby_venues(
                midpoint,
                origin1.location,
                origin2.location,
                VenueScoring::composite(&self.config.venue),
            )
            .await;

        MeetingPointResult {
            origin1,
            origin2,
            meeting_point: Some(midpoint),
            metrics,
            travel_times,
            route: None,
            samples: Vec::new(),
            best_venue,
            venue_alternatives,
        }
    }

    /// Rank venues around the chosen point; lookup failures leave the
    /// venue fields empty rather than failing the search.
    ///
    /// The route flow ranks by the minimax score; the midpoint fallback,
    /// with no route to balance along, uses the composite blend instead.
    async fn rank_nearby_venues(
        &self,
        center: GeoPoint,
        origin1: GeoPoint,
        origin2: GeoPoint,
        scoring: VenueScoring,
    ) -> (Option<RankedVenue>, Vec<RankedVenue>) {
        let venues = match self
            .venues
            .venues_near(center, self.config.venue.radius_m)
            .await
        {
            Ok(venues) => venues,
            Err(err) => {
                warn!("venue lookup failed, omitting venues: {err}");
                return (None, Vec::new());
            }
        };
        let mut ranked = rank_venues(&self.matrix, origin1, origin2, venues, scoring, &self.config)
            .await;
        if ranked.is_empty() {
            return (None, Vec::new());
        }
        let best = ranked.remove(0);
        ranked.truncate(self.config.venue.alternatives);
        (Some(best), ranked)
    }
}
