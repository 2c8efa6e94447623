//! Spatial thinning of evaluation samples for display.

use halfway_core::{Evaluation, ThinningConfig, geometry::haversine_meters};

use crate::pool::compare_objective;

/// Thin `evaluations` to a well-spaced subset for map display.
///
/// Two passes, both scanning best-objective first so the global optimum
/// always survives. The first collapses clusters of near-identical route
/// fractions down to their best member; the second enforces a minimum
/// metre spacing on the ground between what the first pass kept. The kept
/// subset is returned best-first.
#[must_use]
pub fn thin_for_display(evaluations: &[Evaluation], config: &ThinningConfig) -> Vec<Evaluation> {
    let mut ranked: Vec<Evaluation> = evaluations.to_vec();
    ranked.sort_by(compare_objective);
    enforce_min_spacing(cluster_by_fraction(ranked, config), config)
}

fn cluster_by_fraction(ranked: Vec<Evaluation>, config: &ThinningConfig) -> Vec<Evaluation> {
    let mut kept: Vec<Evaluation> = Vec::new();
    for evaluation in ranked {
        let crowded = kept.iter().any(|k| {
            (k.candidate.route_fraction - evaluation.candidate.route_fraction).abs()
                <= config.fraction_tolerance
        });
        if !crowded {
            kept.push(evaluation);
        }
    }
    kept
}

fn enforce_min_spacing(ranked: Vec<Evaluation>, config: &ThinningConfig) -> Vec<Evaluation> {
    let mut kept: Vec<Evaluation> = Vec::new();
    for evaluation in ranked {
        let crowded = kept.iter().any(|k| {
            haversine_meters(k.candidate.point, evaluation.candidate.point)
                <= config.min_spacing_m
        });
        if !crowded {
            kept.push(evaluation);
        }
    }
    kept
}
