//! Asynchronous provider traits for the external mapping service.
//!
//! The engine talks to four collaborators: a geocoder, a transit-route
//! provider, a duration-matrix provider, and a venue provider. All of them
//! are modelled as async traits so that suspension points sit exactly at
//! provider-call boundaries and independent calls can be awaited together.
//!
//! Providers report failure through [`ProviderError`]; "the provider
//! answered but had nothing" is `Ok(None)` (or an absent matrix entry), not
//! an error. Absent matrix entries must never be coerced to zero.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GeoPoint, TransitRoute};

/// A travel-time matrix: one row per origin, one column per destination.
///
/// Entries are transit seconds; `None` means the provider could not resolve
/// that pair.
pub type DurationMatrix = Vec<Vec<Option<f64>>>;

/// Errors from provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never reached the service.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport-level failure description.
        message: String,
    },
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response description.
        message: String,
    },
    /// The service answered with an application-level error code.
    #[error("service error {code}: {message}")]
    Service {
        /// Provider status code (e.g. `"REQUEST_DENIED"`).
        code: String,
        /// Provider error message, possibly empty.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("malformed provider response: {message}")]
    Parse {
        /// Parser failure description.
        message: String,
    },
    /// The caller passed no points to a batched lookup.
    #[error("at least one point is required")]
    EmptyInput,
}

/// A successfully geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// The provider's canonical formatted address.
    pub formatted_address: String,
    /// Resolved coordinate.
    pub location: GeoPoint,
}

/// A venue near a meeting point, from the point-of-interest provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Display name.
    pub name: String,
    /// Short address or vicinity description.
    pub address: String,
    /// Venue coordinate.
    pub location: GeoPoint,
    /// Provider rating, when available.
    pub rating: Option<f64>,
    /// Provider place identifier, when available.
    pub place_id: Option<String>,
}

/// Resolve free-form addresses to coordinates.
#[async_trait]
pub trait Geocoder {
    /// Geocode an address. `Ok(None)` means the address is unresolvable.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ProviderError>;
}

/// Retrieve the fastest transit route between two points.
#[async_trait]
pub trait RouteProvider {
    /// Fetch the fastest transit route. `Ok(None)` means no transit route
    /// exists between the points.
    async fn fastest_transit_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<TransitRoute>, ProviderError>;
}

/// Batched transit durations between origins and destinations.
#[async_trait]
pub trait DurationMatrixProvider {
    /// Fetch an `origins.len() x destinations.len()` matrix of transit
    /// seconds. Unresolvable pairs are `None`, never zero.
    ///
    /// # Errors
    ///
    /// [`ProviderError::EmptyInput`] when either slice is empty; transport
    /// and service errors otherwise.
    async fn durations(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
    ) -> Result<DurationMatrix, ProviderError>;

    /// Fetch a single pairwise transit duration in seconds.
    ///
    /// Lower-throughput path used when the batched call fails.
    async fn duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<f64>, ProviderError>;
}

/// Find venues near a coordinate.
#[async_trait]
pub trait VenueProvider {
    /// List venues within `radius_m` metres of `center`.
    async fn venues_near(
        &self,
        center: GeoPoint,
        radius_m: u32,
    ) -> Result<Vec<Venue>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_render_their_context() {
        let err = ProviderError::Timeout {
            url: "http://maps.example/geocode".into(),
            timeout_secs: 30,
        };
        assert_eq!(
            err.to_string(),
            "request to http://maps.example/geocode timed out after 30s"
        );

        let err = ProviderError::Service {
            code: "OVER_QUERY_LIMIT".into(),
            message: "slow down".into(),
        };
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
    }
}
