//! Route-constrained minimax search for fair meeting points.
//!
//! Given two geocoded origins and the transit route between them, this crate
//! finds the point along (or laterally near) that route minimising the larger
//! of the two parties' travel times. External lookups are batched through the
//! provider traits in `halfway-core`, and the expensive objective is explored
//! with a budget-limited mix of deterministic grid refinement and, when the
//! `surrogate` feature is enabled, one-dimensional Gaussian-process search
//! with Expected-Improvement acquisition.
//!
//! The entry point is [`MeetingPointSearch`], which wires the providers
//! together: parallel geocoding, route retrieval, a global candidate sweep,
//! top-K local refinement, visualisation thinning, and a venue ranking pass
//! around the chosen point. Every provider failure below geocoding degrades
//! to a fallback path rather than surfacing as an error.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "surrogate")]
mod bayes;
mod candidates;
mod evaluate;
#[cfg(feature = "surrogate")]
mod gp;
mod grid;
mod pool;
mod search;
mod thin;
mod venue;

#[cfg(feature = "surrogate")]
pub use bayes::{BayesianSearcher, SearchState};
pub use candidates::generate_global_candidates;
pub use evaluate::TravelTimeEvaluator;
pub use grid::{GridSearchOutcome, coarse_to_fine_search};
pub use pool::EvaluationPool;
pub use search::{
    MeetingPointResult, MeetingPointSearch, RouteSummary, SearchError, TravelTimes,
};
pub use thin::thin_for_display;
pub use venue::{RankedVenue, VenueScoring, rank_venues};
