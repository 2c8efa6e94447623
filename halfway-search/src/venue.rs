//! Ranking nearby venues by the two parties' travel times.

use halfway_core::{
    DurationMatrixProvider, GeoPoint, SearchConfig, Venue, VenueConfig,
};
use serde::Serialize;

use crate::evaluate::resolve_pair_times;

/// How venues are scored once both travel times are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VenueScoring {
    /// Minimise the larger of the two travel times.
    Minimax,
    /// Weighted blend of travel-time imbalance and combined travel time,
    /// both expressed in hours.
    Composite {
        /// Weight on the absolute travel-time difference.
        fairness_weight: f64,
        /// Weight on the summed travel time.
        efficiency_weight: f64,
    },
}

impl VenueScoring {
    /// Composite scoring with the configured weights.
    #[must_use]
    pub fn composite(config: &VenueConfig) -> Self {
        Self::Composite {
            fairness_weight: config.fairness_weight,
            efficiency_weight: config.efficiency_weight,
        }
    }

    /// Score a venue from the two travel times; lower is better.
    #[must_use]
    pub fn score(&self, t1: f64, t2: f64) -> f64 {
        match *self {
            Self::Minimax => t1.max(t2),
            Self::Composite {
                fairness_weight,
                efficiency_weight,
            } => {
                let fairness = (t1 - t2).abs() / 3600.0;
                let efficiency = (t1 + t2) / 3600.0;
                fairness_weight * fairness + efficiency_weight * efficiency
            }
        }
    }
}

/// A venue with resolved travel times and its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVenue {
    /// The venue itself.
    pub venue: Venue,
    /// Transit seconds from the first origin.
    pub time_from_origin1_s: f64,
    /// Transit seconds from the second origin.
    pub time_from_origin2_s: f64,
    /// The score under the strategy used for ranking; lower is better.
    pub score: f64,
}

/// Rank `venues` by travel time from both origins, best first.
///
/// Travel times are resolved through one batched matrix call with the same
/// pairwise fallback the candidate evaluator uses. Venues whose times do not
/// resolve are dropped from the ranking rather than scored with a penalty.
pub async fn rank_venues<M>(
    matrix: &M,
    origin1: GeoPoint,
    origin2: GeoPoint,
    venues: Vec<Venue>,
    scoring: VenueScoring,
    config: &SearchConfig,
) -> Vec<RankedVenue>
where
    M: DurationMatrixProvider + Sync,
{
    let locations: Vec<GeoPoint> = venues.iter().map(|v| v.location).collect();
    let times = resolve_pair_times(
        matrix,
        origin1,
        origin2,
        &locations,
        config.pairwise_fallback_limit,
    )
    .await;

    let mut ranked: Vec<RankedVenue> = times
        .into_iter()
        .filter_map(|(index, t1, t2)| {
            venues.get(index).map(|venue| RankedVenue {
                venue: venue.clone(),
                time_from_origin1_s: t1,
                time_from_origin2_s: t2,
                score: scoring.score(t1, t2),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use halfway_core::test_support::FnMatrixProvider;
    use rstest::rstest;

    fn venue(name: &str, lng: f64) -> Venue {
        Venue {
            name: name.to_owned(),
            address: format!("{name} street"),
            location: GeoPoint::new(0.0, lng),
            rating: None,
            place_id: None,
        }
    }

    #[rstest]
    #[case(600.0, 1200.0, 1200.0)]
    #[case(1500.0, 900.0, 1500.0)]
    fn minimax_scores_the_larger_time(#[case] t1: f64, #[case] t2: f64, #[case] expected: f64) {
        assert_eq!(VenueScoring::Minimax.score(t1, t2), expected);
    }

    #[rstest]
    fn composite_blends_fairness_and_efficiency() {
        let scoring = VenueScoring::composite(&VenueConfig::default());
        // 600 s apart, 3000 s combined: 0.7 * (600/3600) + 0.3 * (3000/3600).
        let score = scoring.score(1200.0, 1800.0);
        assert!((score - (0.7 / 6.0 + 0.3 * 3000.0 / 3600.0)).abs() < 1e-12);
    }

    #[rstest]
    fn composite_prefers_balanced_times_over_a_shorter_unbalanced_pair() {
        let scoring = VenueScoring::composite(&VenueConfig::default());
        let balanced = scoring.score(1500.0, 1500.0);
        let lopsided = scoring.score(300.0, 2400.0);
        assert!(balanced < lopsided);
    }

    #[rstest]
    #[tokio::test]
    async fn ranking_is_best_first_and_drops_unresolved_venues() {
        let provider = FnMatrixProvider::from_fn(|o, d| {
            if d.lng == 2.0 {
                None
            } else {
                Some(d.lng * 600.0 + o.lat)
            }
        });
        let config = SearchConfig::default();
        let venues = vec![venue("far", 3.0), venue("near", 1.0), venue("unknown", 2.0)];
        let ranked = rank_venues(
            &provider,
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            venues,
            VenueScoring::Minimax,
            &config,
        )
        .await;
        let names: Vec<&str> = ranked.iter().map(|r| r.venue.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
        assert!(ranked[0].score < ranked[1].score);
    }

    #[rstest]
    #[tokio::test]
    async fn no_venues_rank_to_an_empty_list() {
        let provider = FnMatrixProvider::from_fn(|_, _| Some(1.0));
        let ranked = rank_venues(
            &provider,
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            Vec::new(),
            VenueScoring::Minimax,
            &SearchConfig::default(),
        )
        .await;
        assert!(ranked.is_empty());
    }
}
