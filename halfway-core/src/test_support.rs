//! Deterministic test doubles for the provider traits.
//!
//! These stubs let search logic be exercised without a live mapping
//! service: the geocoder answers from a fixed table, the route provider
//! returns a pre-built route, and the matrix provider computes durations
//! from a closure so tests can shape the objective surface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    DurationMatrix, DurationMatrixProvider, GeoPoint, GeocodedAddress, Geocoder, ProviderError,
    RouteProvider, TransitRoute, Venue, VenueProvider,
};

/// Geocoder answering from a fixed address table.
#[derive(Debug, Clone, Default)]
pub struct StubGeocoder {
    entries: HashMap<String, GeocodedAddress>,
}

impl StubGeocoder {
    /// An empty geocoder; every lookup resolves to `None`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolvable address.
    #[must_use]
    pub fn with_entry(mut self, address: &str, location: GeoPoint) -> Self {
        self.entries.insert(
            address.to_owned(),
            GeocodedAddress {
                formatted_address: address.to_owned(),
                location,
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ProviderError> {
        Ok(self.entries.get(address).cloned())
    }
}

/// Route provider returning a pre-built route, or none.
#[derive(Debug, Clone, Default)]
pub struct StubRouteProvider {
    route: Option<TransitRoute>,
}

impl StubRouteProvider {
    /// Provider that always returns `route`.
    #[must_use]
    pub fn with_route(route: TransitRoute) -> Self {
        Self { route: Some(route) }
    }

    /// Provider that finds no transit route.
    #[must_use]
    pub fn without_route() -> Self {
        Self { route: None }
    }
}

#[async_trait]
impl RouteProvider for StubRouteProvider {
    async fn fastest_transit_route(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
    ) -> Result<Option<TransitRoute>, ProviderError> {
        Ok(self.route.clone())
    }
}

/// Closure used by [`FnMatrixProvider`] to compute a pairwise duration.
pub type PairDurationFn = dyn Fn(GeoPoint, GeoPoint) -> Option<f64> + Send + Sync;

/// Duration-matrix provider that computes entries from a closure.
///
/// The closure receives `(origin, destination)` and returns transit seconds,
/// or `None` for an unresolvable pair. `failing_batch` makes the batched
/// call error while leaving the pairwise path working, which exercises the
/// evaluator's fallback.
pub struct FnMatrixProvider {
    pair: Box<PairDurationFn>,
    batch_fails: bool,
}

impl std::fmt::Debug for FnMatrixProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMatrixProvider")
            .field("batch_fails", &self.batch_fails)
            .finish()
    }
}

impl FnMatrixProvider {
    /// Provider computing every entry from `pair`.
    #[must_use]
    pub fn from_fn<F>(pair: F) -> Self
    where
        F: Fn(GeoPoint, GeoPoint) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            pair: Box::new(pair),
            batch_fails: false,
        }
    }

    /// Provider whose batched call always fails with a network error but
    /// whose pairwise lookups still answer from `pair`.
    #[must_use]
    pub fn failing_batch<F>(pair: F) -> Self
    where
        F: Fn(GeoPoint, GeoPoint) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            pair: Box::new(pair),
            batch_fails: true,
        }
    }

    /// Provider where every pair is unresolvable.
    #[must_use]
    pub fn all_absent() -> Self {
        Self::from_fn(|_, _| None)
    }
}

#[async_trait]
impl DurationMatrixProvider for FnMatrixProvider {
    async fn durations(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
    ) -> Result<DurationMatrix, ProviderError> {
        if origins.is_empty() || destinations.is_empty() {
            return Err(ProviderError::EmptyInput);
        }
        if self.batch_fails {
            return Err(ProviderError::Network {
                url: "stub://matrix".to_owned(),
                message: "batched call disabled by test".to_owned(),
            });
        }
        Ok(origins
            .iter()
            .map(|&o| destinations.iter().map(|&d| (self.pair)(o, d)).collect())
            .collect())
    }

    async fn duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<f64>, ProviderError> {
        Ok((self.pair)(origin, destination))
    }
}

/// Venue provider returning a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StubVenueProvider {
    venues: Vec<Venue>,
}

impl StubVenueProvider {
    /// Provider returning `venues` for every query.
    #[must_use]
    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// Provider that never finds a venue.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VenueProvider for StubVenueProvider {
    async fn venues_near(
        &self,
        _center: GeoPoint,
        _radius_m: u32,
    ) -> Result<Vec<Venue>, ProviderError> {
        Ok(self.venues.clone())
    }
}
