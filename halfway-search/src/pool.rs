//! Shared pool of completed evaluations.
//!
//! Global sweep and local refinement both feed their results into one pool,
//! so refinement windows can reuse what the sweep already measured and the
//! final ranking sees every observation exactly once.

use halfway_core::Evaluation;
use std::cmp::Ordering;
use std::collections::HashMap;

const KEY_SCALE: f64 = 1e6;

/// Accumulates [`Evaluation`] records across search phases, keeping the
/// first observation for each `(route_fraction, lateral_offset)` pair.
#[derive(Debug, Default)]
pub struct EvaluationPool {
    by_key: HashMap<(i64, i64), usize>,
    evaluations: Vec<Evaluation>,
}

impl EvaluationPool {
    /// An empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an evaluation unless the same sample position was already
    /// recorded. Returns whether the evaluation was kept.
    pub fn insert(&mut self, evaluation: Evaluation) -> bool {
        let key = sample_key(
            evaluation.candidate.route_fraction,
            evaluation.candidate.lateral_offset_m,
        );
        if self.by_key.contains_key(&key) {
            return false;
        }
        self.by_key.insert(key, self.evaluations.len());
        self.evaluations.push(evaluation);
        true
    }

    /// Insert a batch of evaluations.
    pub fn extend<I>(&mut self, evaluations: I)
    where
        I: IntoIterator<Item = Evaluation>,
    {
        for evaluation in evaluations {
            self.insert(evaluation);
        }
    }

    /// Whether a sample at this position was already recorded.
    #[must_use]
    pub fn contains(&self, route_fraction: f64, lateral_offset_m: f64) -> bool {
        self.by_key
            .contains_key(&sample_key(route_fraction, lateral_offset_m))
    }

    /// Every recorded evaluation, in insertion order.
    #[must_use]
    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    /// Number of recorded evaluations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    /// Whether the pool holds no evaluations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// The evaluation with the smallest minimax objective, if any.
    #[must_use]
    pub fn best(&self) -> Option<&Evaluation> {
        self.evaluations
            .iter()
            .min_by(|a, b| compare_objective(a, b))
    }

    /// On-route observations with `route_fraction` in `[lo, hi]`, as
    /// `(fraction, objective)` training pairs for the surrogate.
    #[must_use]
    pub fn on_route_in_window(&self, lo: f64, hi: f64) -> Vec<(f64, f64)> {
        self.evaluations
            .iter()
            .filter(|e| {
                e.candidate.lateral_offset_m == 0.0
                    && e.candidate.route_fraction >= lo
                    && e.candidate.route_fraction <= hi
            })
            .map(|e| (e.candidate.route_fraction, e.max_travel_time_s))
            .collect()
    }

    /// All evaluations, best objective first.
    #[must_use]
    pub fn sorted_by_objective(&self) -> Vec<Evaluation> {
        let mut sorted = self.evaluations.clone();
        sorted.sort_by(compare_objective);
        sorted
    }
}

pub(crate) fn compare_objective(a: &Evaluation, b: &Evaluation) -> Ordering {
    a.max_travel_time_s
        .partial_cmp(&b.max_travel_time_s)
        .unwrap_or(Ordering::Equal)
}

fn sample_key(route_fraction: f64, lateral_offset_m: f64) -> (i64, i64) {
    (
        (route_fraction * KEY_SCALE).round() as i64,
        (lateral_offset_m * KEY_SCALE).round() as i64,
    )
}
