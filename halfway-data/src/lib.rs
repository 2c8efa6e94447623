//! HTTP provider implementations for the meeting-point engine.
//!
//! This crate binds the provider traits from `halfway-core` to a
//! Google-Maps-style web service: geocoding, transit directions, the
//! distance matrix, and nearby venue search. All network specifics live
//! here; the search crates never see a URL or a JSON body.

#![forbid(unsafe_code)]

pub mod maps;

pub use maps::{HttpMapsProvider, MapsClientConfig, MapsClientError};
