//! Deterministic coarse-to-fine grid search along the route.

use halfway_core::{
    Candidate, DurationMatrixProvider, Evaluation, GeoPoint, RouteGeometry, SearchConfig,
};

use crate::candidates::evenly_spaced;
use crate::evaluate::TravelTimeEvaluator;
use crate::pool::{EvaluationPool, compare_objective};

/// Result of one coarse-to-fine run.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    /// The best on-route evaluation found, if any round produced data.
    pub best: Option<Evaluation>,
    /// Every evaluation performed, in the order the rounds issued them.
    pub evaluations: Vec<Evaluation>,
}

/// Coarse-to-fine minimax search over `[window_lo, window_hi]`.
///
/// Samples the window on an even grid, then repeatedly halves the window
/// around the incumbent and resamples, stopping after the configured number
/// of refinement rounds or once the window narrows below the minimum
/// fraction. Fractions already evaluated in an earlier round are not
/// re-queried. A round that yields no data (provider outage, unreachable
/// points) ends the search; the incumbent from earlier rounds stands.
pub async fn coarse_to_fine_search<M>(
    evaluator: &TravelTimeEvaluator<'_, M>,
    geometry: &RouteGeometry,
    origin1: GeoPoint,
    origin2: GeoPoint,
    window_lo: f64,
    window_hi: f64,
    config: &SearchConfig,
) -> GridSearchOutcome
where
    M: DurationMatrixProvider + Sync,
{
    let mut pool = EvaluationPool::new();
    let mut lo = window_lo.clamp(0.0, 1.0);
    let mut hi = window_hi.clamp(0.0, 1.0);
    if hi < lo {
        std::mem::swap(&mut lo, &mut hi);
    }
    let mut best: Option<Evaluation> = None;

    let rounds = config.grid.refinement_rounds + 1;
    for round in 0..rounds {
        let samples = if round == 0 {
            config.grid.initial_samples
        } else {
            config.grid.refinement_samples
        };
        let candidates: Vec<Candidate> = evenly_spaced(lo, hi, samples)
            .into_iter()
            .filter(|&f| !pool.contains(f, 0.0))
            .map(|f| geometry.candidate_at(f, 0.0))
            .collect();
        let round_evals = evaluator.evaluate(origin1, origin2, &candidates).await;
        if round_evals.is_empty() {
            break;
        }
        for evaluation in round_evals {
            if pool.insert(evaluation) {
                let better = best
                    .as_ref()
                    .is_none_or(|b| compare_objective(&evaluation, b).is_lt());
                if better {
                    best = Some(evaluation);
                }
            }
        }

        let Some(incumbent) = best.as_ref() else {
            break;
        };
        let width = (hi - lo) * config.grid.shrink_factor;
        if width < config.grid.min_window {
            break;
        }
        let center = incumbent.candidate.route_fraction;
        lo = (center - width / 2.0).max(0.0);
        hi = (center + width / 2.0).min(1.0);
    }

    GridSearchOutcome {
        best,
        evaluations: pool.evaluations().to_vec(),
    }
}
