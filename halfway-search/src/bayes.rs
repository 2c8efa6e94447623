//! Gaussian-process guided search along the route.
//!
//! Each window run seeds the model with evenly spaced observations (plus
//! anything the pool already holds for that window), then alternates
//! between fitting the surrogate and evaluating the batch of fractions
//! with the highest Expected Improvement. Off-route lateral probes ride
//! along with each picked fraction but only on-route observations train
//! the model.

use halfway_core::{
    BayesConfig, Candidate, DurationMatrixProvider, GeoPoint, RouteGeometry, SearchConfig,
};
use log::debug;

use crate::candidates::evenly_spaced;
use crate::evaluate::TravelTimeEvaluator;
use crate::gp::{GpModel, expected_improvement};
use crate::pool::EvaluationPool;

/// On-route observation history for one window run.
///
/// Fractions are recorded in evaluation order; the convergence check looks
/// at the spread of the most recent objectives.
#[derive(Debug, Default)]
pub struct SearchState {
    tried: Vec<f64>,
    fractions: Vec<f64>,
    objectives: Vec<f64>,
}

impl SearchState {
    /// An empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved on-route observation.
    pub fn record(&mut self, fraction: f64, objective: f64) {
        self.mark_tried(fraction);
        self.fractions.push(fraction);
        self.objectives.push(objective);
    }

    /// Mark a fraction as attempted so the acquisition step never
    /// re-proposes it, even when the evaluation produced no data.
    pub fn mark_tried(&mut self, fraction: f64) {
        self.tried.push(fraction);
    }

    /// Whether `fraction` lies within `tolerance` of an attempted one.
    #[must_use]
    pub fn tried(&self, fraction: f64, tolerance: f64) -> bool {
        self.tried.iter().any(|&t| (t - fraction).abs() < tolerance)
    }

    /// Number of resolved observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    /// Whether no observation has resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// The `(fractions, objectives)` training data, in evaluation order.
    #[must_use]
    pub fn observations(&self) -> (&[f64], &[f64]) {
        (&self.fractions, &self.objectives)
    }

    /// Whether the trailing observations have settled: enough history, and
    /// the standard deviation of the last few objectives under the
    /// configured threshold.
    #[must_use]
    pub fn converged(&self, config: &BayesConfig) -> bool {
        if self.objectives.len() <= config.min_history_for_stop {
            return false;
        }
        let tail = &self.objectives[self.objectives.len() - config.convergence_window.min(self.objectives.len())..];
        let mean = tail.iter().sum::<f64>() / tail.len() as f64;
        let variance = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / tail.len() as f64;
        variance.sqrt() < config.convergence_std_seconds
    }
}

/// Expected-Improvement search over a fraction window.
pub struct BayesianSearcher<'a, M> {
    evaluator: &'a TravelTimeEvaluator<'a, M>,
    geometry: &'a RouteGeometry,
    origin1: GeoPoint,
    origin2: GeoPoint,
    config: &'a SearchConfig,
}

impl<'a, M> BayesianSearcher<'a, M>
where
    M: DurationMatrixProvider + Sync,
{
    /// Wire the searcher to an evaluator and route.
    #[must_use]
    pub fn new(
        evaluator: &'a TravelTimeEvaluator<'a, M>,
        geometry: &'a RouteGeometry,
        origin1: GeoPoint,
        origin2: GeoPoint,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            evaluator,
            geometry,
            origin1,
            origin2,
            config,
        }
    }

    /// Search the whole route, one on-route pick per iteration.
    pub async fn search_global(&self, pool: &mut EvaluationPool) {
        let bayes = &self.config.bayes;
        self.run_window(
            0.0,
            1.0,
            bayes.global_iterations,
            bayes.global_batch_size,
            bayes.global_length_scale,
            bayes.global_grid_points,
            &[0.0],
            pool,
        )
        .await;
    }

    /// Refine a local window around `center`, probing lateral offsets at
    /// each picked fraction.
    pub async fn refine_around(&self, center: f64, pool: &mut EvaluationPool) {
        let half = self.config.local_window_half_width;
        let lo = (center - half).max(0.0);
        let hi = (center + half).min(1.0);
        let bayes = &self.config.bayes;
        self.run_window(
            lo,
            hi,
            bayes.local_iterations,
            bayes.local_batch_size,
            bayes.local_length_scale,
            bayes.local_grid_points,
            &self.config.refine_lateral_offsets_m,
            pool,
        )
        .await;
    }

    #[allow(clippy::too_many_arguments, reason = "internal window driver")]
    async fn run_window(
        &self,
        lo: f64,
        hi: f64,
        iterations: usize,
        batch_size: usize,
        length_scale: f64,
        grid_points: usize,
        probes: &[f64],
        pool: &mut EvaluationPool,
    ) {
        let bayes = &self.config.bayes;
        let mut state = SearchState::new();
        for (fraction, objective) in pool.on_route_in_window(lo, hi) {
            state.record(fraction, objective);
        }

        let seeds: Vec<f64> = evenly_spaced(lo, hi, bayes.seed_samples)
            .into_iter()
            .filter(|&f| !state.tried(f, bayes.tried_tolerance))
            .collect();
        self.observe(&seeds, probes, pool, &mut state).await;
        if state.is_empty() {
            // Insurance sample so an empty window still yields one
            // observation when the surface is reachable at its centre.
            self.observe(&[(lo + hi) / 2.0], probes, pool, &mut state)
                .await;
        }
        if state.is_empty() {
            debug!("window [{lo:.3}, {hi:.3}] produced no observations, skipping acquisition");
            return;
        }

        for iteration in 0..iterations {
            if state.converged(bayes) {
                debug!("window [{lo:.3}, {hi:.3}] converged after {iteration} iterations");
                break;
            }
            let picks = self.acquire(&state, lo, hi, batch_size, length_scale, grid_points);
            if picks.is_empty() {
                break;
            }
            self.observe(&picks, probes, pool, &mut state).await;
        }
    }

    /// Top-EI fractions from the acquisition grid, separated by the
    /// configured fraction of the window width.
    fn acquire(
        &self,
        state: &SearchState,
        lo: f64,
        hi: f64,
        batch_size: usize,
        length_scale: f64,
        grid_points: usize,
    ) -> Vec<f64> {
        let bayes = &self.config.bayes;
        let (x, y) = state.observations();
        let model = GpModel::fit(x, y, length_scale, bayes.noise);
        let grid = evenly_spaced(lo, hi, grid_points);
        let posterior = model.posterior(&grid);
        let incumbent = y.iter().copied().fold(f64::INFINITY, f64::min);

        let mut scored: Vec<(f64, f64)> = grid
            .iter()
            .zip(posterior.mean.iter().zip(posterior.std.iter()))
            .filter(|&(&f, _)| !state.tried(f, bayes.tried_tolerance))
            .map(|(&f, (&mean, &std))| {
                (
                    f,
                    expected_improvement(mean, std, incumbent, bayes.ei_xi_seconds),
                )
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let min_separation = bayes.batch_separation_factor * (hi - lo);
        let mut picks: Vec<f64> = Vec::new();
        for (fraction, ei) in scored {
            if picks.len() == batch_size {
                break;
            }
            if ei <= 0.0 {
                break;
            }
            if picks.iter().all(|&p| (p - fraction).abs() >= min_separation) {
                picks.push(fraction);
            }
        }
        picks
    }

    /// Evaluate each fraction at every probe offset, feed on-route results
    /// into the state, and record everything in the pool.
    async fn observe(
        &self,
        fractions: &[f64],
        probes: &[f64],
        pool: &mut EvaluationPool,
        state: &mut SearchState,
    ) {
        if fractions.is_empty() {
            return;
        }
        let mut candidates: Vec<Candidate> = Vec::new();
        for &fraction in fractions {
            state.mark_tried(fraction);
            for &offset in probes {
                if !pool.contains(fraction, offset) {
                    candidates.push(self.geometry.candidate_at(fraction, offset));
                }
            }
        }
        let evaluations = self
            .evaluator
            .evaluate(self.origin1, self.origin2, &candidates)
            .await;
        for evaluation in evaluations {
            if pool.insert(evaluation) && evaluation.candidate.lateral_offset_m == 0.0 {
                state.record(
                    evaluation.candidate.route_fraction,
                    evaluation.max_travel_time_s,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halfway_core::geometry::haversine_meters;
    use halfway_core::test_support::FnMatrixProvider;
    use rstest::{fixture, rstest};

    #[fixture]
    fn straight_geometry() -> RouteGeometry {
        RouteGeometry::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.5),
            GeoPoint::new(0.0, 1.0),
        ])
    }

    fn walking_times(origin1: GeoPoint, origin2: GeoPoint) -> FnMatrixProvider {
        FnMatrixProvider::from_fn(move |o, d| {
            let from = if o == origin1 { origin1 } else { origin2 };
            Some(haversine_meters(from, d) / 1.4)
        })
    }

    #[rstest]
    fn convergence_requires_history_and_a_settled_tail() {
        let config = BayesConfig::default();
        let mut state = SearchState::new();
        for i in 0..=config.min_history_for_stop {
            state.record(f64::from(i as u32) / 20.0, 600.0 + f64::from(i as u32));
        }
        assert!(state.converged(&config));

        let mut noisy = SearchState::new();
        for i in 0..=config.min_history_for_stop {
            let swing = if i % 2 == 0 { 0.0 } else { 200.0 };
            noisy.record(f64::from(i as u32) / 20.0, 600.0 + swing);
        }
        assert!(!noisy.converged(&config));
    }

    #[rstest]
    fn short_histories_never_converge() {
        let config = BayesConfig::default();
        let mut state = SearchState::new();
        for i in 0..config.min_history_for_stop {
            state.record(f64::from(i as u32) / 20.0, 600.0);
        }
        assert!(!state.converged(&config));
    }

    #[rstest]
    fn tried_fractions_match_within_tolerance() {
        let mut state = SearchState::new();
        state.mark_tried(0.5);
        assert!(state.tried(0.500_05, 1e-4));
        assert!(!state.tried(0.501, 1e-4));
    }

    #[rstest]
    #[tokio::test]
    async fn global_search_homes_in_on_the_balanced_fraction(straight_geometry: RouteGeometry) {
        let origin1 = GeoPoint::new(0.0, 0.0);
        let origin2 = GeoPoint::new(0.0, 1.0);
        let provider = walking_times(origin1, origin2);
        let config = SearchConfig::default();
        let evaluator = TravelTimeEvaluator::new(&provider, &config);
        let searcher =
            BayesianSearcher::new(&evaluator, &straight_geometry, origin1, origin2, &config);
        let mut pool = EvaluationPool::new();
        searcher.search_global(&mut pool).await;
        let best = pool.best().expect("observations recorded");
        assert!((best.candidate.route_fraction - 0.5).abs() < 0.05);
    }

    #[rstest]
    #[tokio::test]
    async fn refinement_probes_lateral_offsets(straight_geometry: RouteGeometry) {
        let origin1 = GeoPoint::new(0.0, 0.0);
        let origin2 = GeoPoint::new(0.0, 1.0);
        let provider = walking_times(origin1, origin2);
        let config = SearchConfig::default();
        let evaluator = TravelTimeEvaluator::new(&provider, &config);
        let searcher =
            BayesianSearcher::new(&evaluator, &straight_geometry, origin1, origin2, &config);
        let mut pool = EvaluationPool::new();
        searcher.refine_around(0.5, &mut pool).await;
        assert!(
            pool.evaluations()
                .iter()
                .any(|e| e.candidate.lateral_offset_m != 0.0)
        );
        assert!(
            pool.evaluations()
                .iter()
                .all(|e| (0.44..=0.56).contains(&e.candidate.route_fraction))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_window_records_nothing(straight_geometry: RouteGeometry) {
        let provider = FnMatrixProvider::all_absent();
        let config = SearchConfig::default();
        let evaluator = TravelTimeEvaluator::new(&provider, &config);
        let searcher = BayesianSearcher::new(
            &evaluator,
            &straight_geometry,
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            &config,
        );
        let mut pool = EvaluationPool::new();
        searcher.refine_around(0.5, &mut pool).await;
        assert!(pool.is_empty());
    }
}
