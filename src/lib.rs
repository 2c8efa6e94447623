//! Halfway engine: route-constrained fair meeting-point search.
//!
//! This facade re-exports the engine's crates so applications depend on a
//! single package:
//!
//! - [`core`] - geographic value types, provider traits, and configuration.
//! - [`search`] - the minimax search engine and its orchestrator.
//! - [`data`] - HTTP provider implementations (behind the `http-providers`
//!   feature).
//!
//! # Examples
//! ```
//! use halfway_engine::core::SearchConfig;
//!
//! let config = SearchConfig::default().with_top_k_refine(4);
//! assert_eq!(config.top_k_refine, 4);
//! ```

#![forbid(unsafe_code)]

pub use halfway_core as core;
#[cfg(feature = "http-providers")]
pub use halfway_data as data;
pub use halfway_search as search;

pub use halfway_core::{GeoPoint, SearchConfig};
pub use halfway_search::{MeetingPointResult, MeetingPointSearch, SearchError};
