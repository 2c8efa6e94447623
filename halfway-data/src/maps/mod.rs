//! Google-Maps-style web service client.

mod client;
mod response;

pub use client::{HttpMapsProvider, MapsClientConfig, MapsClientError};
pub use response::{
    DirectionsResponse, DistanceMatrixResponse, GeocodeResponse, NearbySearchResponse,
};
