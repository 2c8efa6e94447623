//! HTTP client implementing the four provider traits.

use std::time::Duration;

use async_trait::async_trait;
use halfway_core::polyline;
use halfway_core::{
    DurationMatrix, DurationMatrixProvider, GeoPoint, GeocodedAddress, Geocoder, ProviderError,
    RouteProvider, TransitRoute, Venue, VenueProvider,
};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::response::{
    DirectionsResponse, DistanceMatrixResponse, GeocodeResponse, NearbySearchResponse,
    ServiceStatus,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for requests.
pub const DEFAULT_USER_AGENT: &str = "halfway-engine/0.1";

/// The matrix endpoint rejects requests with more destinations than this,
/// so batched lookups are split into chunks.
const MAX_MATRIX_DESTINATIONS: usize = 25;

/// Venue category requested from the nearby-search endpoint.
const VENUE_TYPE: &str = "cafe";

/// Construction failures for [`HttpMapsProvider`].
#[derive(Debug, Error)]
pub enum MapsClientError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// The base URL did not parse.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Configuration for [`HttpMapsProvider`].
#[derive(Debug, Clone)]
pub struct MapsClientConfig {
    /// Base URL of the mapping service.
    pub base_url: String,
    /// API key appended to every request.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl MapsClientConfig {
    /// Create a configuration with the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP implementation of the geocoder, route, matrix, and venue providers.
///
/// One client instance is shared across all four concerns; the underlying
/// connection pool is reused between calls.
#[derive(Debug)]
pub struct HttpMapsProvider {
    client: Client,
    base: Url,
    config: MapsClientConfig,
}

impl HttpMapsProvider {
    /// Create a provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MapsClientError`] when the HTTP client fails to build or
    /// the base URL does not parse.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, MapsClientError> {
        Self::with_config(MapsClientConfig::new(base_url, api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MapsClientError`] when the HTTP client fails to build or
    /// the base URL does not parse.
    pub fn with_config(config: MapsClientConfig) -> Result<Self, MapsClientError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        let base = Url::parse(config.base_url.trim_end_matches('/'))?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Build an endpoint URL with query parameters and the API key.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ProviderError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| ProviderError::Parse {
                message: format!("invalid endpoint path {path}: {err}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("key", &self.config.api_key);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let display_url = url.as_str().to_owned();
        debug!("GET {}", redact_key(&display_url));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &display_url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &display_url))?;
        response.json().await.map_err(|err| ProviderError::Parse {
            message: err.to_string(),
        })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ProviderError {
        let url = redact_key(url);
        if error.is_timeout() {
            return ProviderError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return ProviderError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        ProviderError::Network {
            url,
            message: error.to_string(),
        }
    }

    async fn matrix_chunk(
        &self,
        origins: &str,
        destinations: &[GeoPoint],
    ) -> Result<Vec<Vec<Option<f64>>>, ProviderError> {
        let destination_param = join_coords(destinations);
        let url = self.endpoint(
            "/maps/api/distancematrix/json",
            &[
                ("origins", origins),
                ("destinations", &destination_param),
                ("mode", "transit"),
            ],
        )?;
        let response: DistanceMatrixResponse = self.get_json(url).await?;
        if !response.is_ok() {
            return Err(service_error(&response));
        }
        Ok(response
            .rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<f64>> =
                    row.elements.iter().map(|e| e.seconds()).collect();
                cells.resize(destinations.len(), None);
                cells
            })
            .collect())
    }
}

#[async_trait]
impl Geocoder for HttpMapsProvider {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ProviderError> {
        let url = self.endpoint("/maps/api/geocode/json", &[("address", address)])?;
        let response: GeocodeResponse = self.get_json(url).await?;
        if response.is_zero_results() {
            return Ok(None);
        }
        if !response.is_ok() {
            return Err(service_error(&response));
        }
        Ok(response.results.into_iter().next().map(|result| {
            GeocodedAddress {
                formatted_address: result.formatted_address,
                location: GeoPoint::new(result.geometry.location.lat, result.geometry.location.lng),
            }
        }))
    }
}

#[async_trait]
impl RouteProvider for HttpMapsProvider {
    async fn fastest_transit_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<TransitRoute>, ProviderError> {
        let url = self.endpoint(
            "/maps/api/directions/json",
            &[
                ("origin", &coord_param(origin)),
                ("destination", &coord_param(destination)),
                ("mode", "transit"),
            ],
        )?;
        let response: DirectionsResponse = self.get_json(url).await?;
        if response.is_zero_results() {
            return Ok(None);
        }
        if !response.is_ok() {
            return Err(service_error(&response));
        }
        let Some(route) = response.routes.into_iter().next() else {
            return Ok(None);
        };
        let points = polyline::decode(&route.overview_polyline.points).map_err(|err| {
            ProviderError::Parse {
                message: format!("undecodable route geometry: {err}"),
            }
        })?;
        let distance_meters = route.legs.iter().map(|l| l.distance.value).sum();
        let duration_seconds = route.legs.iter().map(|l| l.duration.value).sum();
        Ok(Some(TransitRoute {
            points,
            distance_meters,
            duration_seconds,
            encoded_geometry: route.overview_polyline.points,
        }))
    }
}

#[async_trait]
impl DurationMatrixProvider for HttpMapsProvider {
    async fn durations(
        &self,
        origins: &[GeoPoint],
        destinations: &[GeoPoint],
    ) -> Result<DurationMatrix, ProviderError> {
        if origins.is_empty() || destinations.is_empty() {
            return Err(ProviderError::EmptyInput);
        }
        let origin_param = join_coords(origins);
        let mut matrix: DurationMatrix = vec![Vec::with_capacity(destinations.len()); origins.len()];
        for chunk in destinations.chunks(MAX_MATRIX_DESTINATIONS) {
            let rows = self.matrix_chunk(&origin_param, chunk).await?;
            for (origin_index, row) in matrix.iter_mut().enumerate() {
                match rows.get(origin_index) {
                    Some(cells) => row.extend(cells.iter().copied()),
                    None => row.extend(std::iter::repeat_n(None, chunk.len())),
                }
            }
        }
        Ok(matrix)
    }

    async fn duration(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<f64>, ProviderError> {
        let matrix = self.durations(&[origin], &[destination]).await?;
        Ok(matrix
            .first()
            .and_then(|row| row.first())
            .copied()
            .flatten())
    }
}

#[async_trait]
impl VenueProvider for HttpMapsProvider {
    async fn venues_near(
        &self,
        center: GeoPoint,
        radius_m: u32,
    ) -> Result<Vec<Venue>, ProviderError> {
        let url = self.endpoint(
            "/maps/api/place/nearbysearch/json",
            &[
                ("location", &coord_param(center)),
                ("radius", &radius_m.to_string()),
                ("type", VENUE_TYPE),
            ],
        )?;
        let response: NearbySearchResponse = self.get_json(url).await?;
        if response.is_zero_results() {
            return Ok(Vec::new());
        }
        if !response.is_ok() {
            return Err(service_error(&response));
        }
        Ok(response
            .results
            .into_iter()
            .map(|place| Venue {
                name: place.name,
                address: place.vicinity.unwrap_or_default(),
                location: GeoPoint::new(place.geometry.location.lat, place.geometry.location.lng),
                rating: place.rating,
                place_id: place.place_id,
            })
            .collect())
    }
}

fn coord_param(point: GeoPoint) -> String {
    format!("{},{}", point.lat, point.lng)
}

fn join_coords(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(|&p| coord_param(p))
        .collect::<Vec<_>>()
        .join("|")
}

fn service_error<R>(response: &R) -> ProviderError
where
    R: ServiceStatus + ErrorMessage,
{
    ProviderError::Service {
        code: response.status().to_owned(),
        message: response.error_message().unwrap_or_default().to_owned(),
    }
}

/// Access to the optional `error_message` field shared by all responses.
trait ErrorMessage {
    fn error_message(&self) -> Option<&str>;
}

macro_rules! error_message {
    ($ty:ty) => {
        impl ErrorMessage for $ty {
            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }
        }
    };
}

error_message!(GeocodeResponse);
error_message!(DirectionsResponse);
error_message!(DistanceMatrixResponse);
error_message!(NearbySearchResponse);

/// Strip the API key value from a URL before it reaches a log or error.
fn redact_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    if k == "key" {
                        (k.into_owned(), "REDACTED".to_owned())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .collect();
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            parsed.into()
        }
        Err(_) => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> HttpMapsProvider {
        HttpMapsProvider::new("http://maps.example.com", "secret")
            .expect("provider should build")
    }

    #[rstest]
    fn endpoint_appends_params_and_key(provider: HttpMapsProvider) {
        let url = provider
            .endpoint("/maps/api/geocode/json", &[("address", "Alexanderplatz")])
            .expect("endpoint should build");
        assert_eq!(url.host_str(), Some("maps.example.com"));
        assert_eq!(url.path(), "/maps/api/geocode/json");
        let query = url.query().expect("query present");
        assert!(query.contains("address=Alexanderplatz"));
        assert!(query.contains("key=secret"));
    }

    #[rstest]
    fn coordinates_are_joined_with_pipes() {
        let joined = join_coords(&[GeoPoint::new(52.5, 13.4), GeoPoint::new(48.1, 11.6)]);
        assert_eq!(joined, "52.5,13.4|48.1,11.6");
    }

    #[rstest]
    fn redaction_hides_only_the_key(provider: HttpMapsProvider) {
        let url = provider
            .endpoint("/maps/api/geocode/json", &[("address", "Berlin")])
            .expect("endpoint should build");
        let redacted = redact_key(url.as_str());
        assert!(redacted.contains("address=Berlin"));
        assert!(redacted.contains("key=REDACTED"));
        assert!(!redacted.contains("secret"));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = MapsClientConfig::new("http://example.com", "k")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[rstest]
    fn short_matrix_rows_are_padded_with_absent_entries() {
        let response: DistanceMatrixResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "rows": [{ "elements": [{ "status": "OK", "duration": { "value": 100.0 } }] }]
            }"#,
        )
        .expect("should deserialise");
        let row = &response.rows[0];
        let mut cells: Vec<Option<f64>> = row.elements.iter().map(|e| e.seconds()).collect();
        cells.resize(3, None);
        assert_eq!(cells, vec![Some(100.0), None, None]);
    }

    #[rstest]
    fn service_error_carries_status_and_message() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{ "status": "OVER_QUERY_LIMIT", "error_message": "slow down" }"#,
        )
        .expect("should deserialise");
        let err = service_error(&response);
        assert!(matches!(
            err,
            ProviderError::Service { code, message }
                if code == "OVER_QUERY_LIMIT" && message == "slow down"
        ));
    }
}
