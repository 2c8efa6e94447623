//! Response types for the mapping service's JSON APIs.
//!
//! Every endpoint wraps its payload in a `status` field: `"OK"` carries
//! data, `"ZERO_RESULTS"` is a successful empty answer, and anything else
//! is an application-level error. The helpers here only deserialise; the
//! client decides how each status maps onto the provider traits.

use serde::Deserialize;

/// A `lat`/`lng` pair as the service encodes coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Shared `status` handling for all endpoints.
pub(crate) trait ServiceStatus {
    fn status(&self) -> &str;

    /// The request succeeded and carries data.
    fn is_ok(&self) -> bool {
        self.status() == "OK"
    }

    /// The request succeeded but matched nothing.
    fn is_zero_results(&self) -> bool {
        self.status() == "ZERO_RESULTS"
    }
}

macro_rules! service_status {
    ($ty:ty) => {
        impl ServiceStatus for $ty {
            fn status(&self) -> &str {
                &self.status
            }
        }
    };
}

/// Geocoding endpoint response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    /// Endpoint status code.
    pub status: String,
    /// Optional error detail for non-`OK` statuses.
    pub error_message: Option<String>,
    /// Matches, best first.
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}
service_status!(GeocodeResponse);

/// One geocoding match.
#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    /// The service's canonical formatted address.
    pub formatted_address: String,
    /// Location container.
    pub geometry: Geometry,
}

/// Geometry container shared by geocoding and place results.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// The result's coordinate.
    pub location: LatLng,
}

/// Directions endpoint response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// Endpoint status code.
    pub status: String,
    /// Optional error detail for non-`OK` statuses.
    pub error_message: Option<String>,
    /// Computed routes, best first.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}
service_status!(DirectionsResponse);

/// One computed route.
#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    /// Compact encoded geometry of the whole route.
    pub overview_polyline: OverviewPolyline,
    /// Route legs; a single-destination request has one leg.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Encoded polyline wrapper.
#[derive(Debug, Deserialize)]
pub struct OverviewPolyline {
    /// The encoded polyline string.
    pub points: String,
}

/// One leg of a route.
#[derive(Debug, Deserialize)]
pub struct RouteLeg {
    /// Leg distance.
    pub distance: ScalarValue,
    /// Leg duration.
    pub duration: ScalarValue,
}

/// A `{ "value": n, "text": ... }` scalar; only the numeric value is used.
#[derive(Debug, Deserialize)]
pub struct ScalarValue {
    /// The numeric quantity (metres or seconds depending on context).
    pub value: f64,
}

/// Distance-matrix endpoint response.
#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    /// Endpoint status code.
    pub status: String,
    /// Optional error detail for non-`OK` statuses.
    pub error_message: Option<String>,
    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}
service_status!(DistanceMatrixResponse);

/// One origin's row of matrix elements.
#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    /// One element per destination, in request order.
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// One origin-destination cell.
///
/// The element has its own status: `"OK"` carries a duration, anything
/// else (`"ZERO_RESULTS"`, `"NOT_FOUND"`) means the pair is unresolvable.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    /// Element status code.
    pub status: String,
    /// Transit duration, present when the element status is `"OK"`.
    pub duration: Option<ScalarValue>,
}

impl MatrixElement {
    /// Transit seconds for this pair, or `None` when unresolvable.
    #[must_use]
    pub fn seconds(&self) -> Option<f64> {
        if self.status == "OK" {
            self.duration.as_ref().map(|d| d.value)
        } else {
            None
        }
    }
}

/// Nearby-search endpoint response.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    /// Endpoint status code.
    pub status: String,
    /// Optional error detail for non-`OK` statuses.
    pub error_message: Option<String>,
    /// Venues, in the service's relevance order.
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}
service_status!(NearbySearchResponse);

/// One venue result.
#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    /// Display name.
    pub name: String,
    /// Short address description.
    #[serde(default)]
    pub vicinity: Option<String>,
    /// Location container.
    pub geometry: Geometry,
    /// Aggregate rating, when the service has one.
    pub rating: Option<f64>,
    /// Stable place identifier.
    pub place_id: Option<String>,
}
