//! Core domain types for the Halfway meeting-point engine.
//!
//! The engine finds a fair meeting point for two parties by searching along
//! the transit route between their origins, minimising the larger of the two
//! travel times. This crate holds the value types that flow through that
//! search, the geometry routines it relies on, the asynchronous provider
//! traits for the external mapping service, and the [`SearchConfig`] that
//! carries every tunable.
//!
//! Search algorithms live in `halfway-search`; HTTP provider implementations
//! live in `halfway-data`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod candidate;
mod config;
pub mod geometry;
mod point;
pub mod polyline;
mod provider;
mod route;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use candidate::{Candidate, Evaluation};
pub use config::{
    BayesConfig, GridSearchConfig, SearchConfig, ThinningConfig, VenueConfig,
};
pub use point::GeoPoint;
pub use provider::{
    DurationMatrix, DurationMatrixProvider, GeocodedAddress, Geocoder, ProviderError,
    RouteProvider, Venue, VenueProvider,
};
pub use route::{RouteGeometry, TransitRoute};
