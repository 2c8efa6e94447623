//! One-dimensional Gaussian-process regression over route fractions.
//!
//! The objective surface is modelled with an RBF kernel over `[0, 1]`
//! fractions. Observations are exact matrix lookups, so only a small
//! diagonal jitter is added for numerical stability. When the training
//! covariance is not positive definite the model degrades to the empirical
//! mean and variance of the observations rather than failing the search.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

const MIN_STD: f64 = 1e-9;

/// Posterior mean and standard deviation over a query grid.
#[derive(Debug, Clone)]
pub(crate) struct Posterior {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// A fitted Gaussian process over scalar inputs.
pub(crate) struct GpModel {
    train_x: Vec<f64>,
    length_scale: f64,
    factor: Option<GpFactor>,
    fallback_mean: f64,
    fallback_std: f64,
}

struct GpFactor {
    cholesky: Cholesky<f64, Dyn>,
    alpha: DVector<f64>,
}

impl GpModel {
    /// Fit the model to `(x, y)` observations.
    ///
    /// `x` and `y` must be the same length and non-empty.
    pub(crate) fn fit(x: &[f64], y: &[f64], length_scale: f64, noise: f64) -> Self {
        let n = x.len();
        let mean = y.iter().sum::<f64>() / n as f64;
        let variance = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let fallback_std = variance.sqrt().max(MIN_STD);

        let mut kernel = DMatrix::from_fn(n, n, |i, j| rbf(x[i], x[j], length_scale));
        for i in 0..n {
            kernel[(i, i)] += noise;
        }
        let targets = DVector::from_iterator(n, y.iter().copied());
        let factor = kernel.cholesky().map(|cholesky| {
            let alpha = cholesky.solve(&targets);
            GpFactor { cholesky, alpha }
        });

        Self {
            train_x: x.to_vec(),
            length_scale,
            factor,
            fallback_mean: mean,
            fallback_std,
        }
    }

    /// Posterior mean and standard deviation at each grid point.
    pub(crate) fn posterior(&self, grid: &[f64]) -> Posterior {
        let Some(factor) = &self.factor else {
            return Posterior {
                mean: vec![self.fallback_mean; grid.len()],
                std: vec![self.fallback_std; grid.len()],
            };
        };

        let n = self.train_x.len();
        let mut mean = Vec::with_capacity(grid.len());
        let mut std = Vec::with_capacity(grid.len());
        let lower = factor.cholesky.l();
        for &q in grid {
            let k_star = DVector::from_fn(n, |i, _| rbf(self.train_x[i], q, self.length_scale));
            mean.push(k_star.dot(&factor.alpha));
            // var = k(q,q) - ||L^-1 k*||^2, floored at zero.
            let v = lower
                .solve_lower_triangular(&k_star)
                .map(|solved| solved.norm_squared())
                .unwrap_or(0.0);
            let variance = (1.0 - v).max(0.0);
            std.push(variance.sqrt());
        }
        Posterior { mean, std }
    }
}

fn rbf(a: f64, b: f64, length_scale: f64) -> f64 {
    let d = (a - b) / length_scale;
    (-0.5 * d * d).exp()
}

/// Closed-form Expected Improvement for minimisation.
///
/// `incumbent` is the best (lowest) objective seen so far; `xi` is the
/// exploration margin in the objective's units. Points with negligible
/// posterior uncertainty score zero, as do points whose predicted mean is
/// not below the margin-adjusted incumbent.
pub(crate) fn expected_improvement(mean: f64, std: f64, incumbent: f64, xi: f64) -> f64 {
    if std < MIN_STD {
        return 0.0;
    }
    let improvement = incumbent - xi - mean;
    if improvement < 0.0 {
        return 0.0;
    }
    let z = improvement / std;
    improvement * normal_cdf(z) + std * normal_pdf(z)
}

fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 0.842_700_79)]
    #[case(-1.0, -0.842_700_79)]
    #[case(2.0, 0.995_322_27)]
    fn erf_matches_reference_values(#[case] x: f64, #[case] expected: f64) {
        assert!((erf(x) - expected).abs() < 1e-6);
    }

    #[rstest]
    fn posterior_interpolates_the_training_data() {
        let x = [0.0, 0.25, 0.5, 0.75, 1.0];
        let y = [1000.0, 800.0, 600.0, 800.0, 1000.0];
        let model = GpModel::fit(&x, &y, 0.15, 1e-6);
        let posterior = model.posterior(&x);
        for (predicted, actual) in posterior.mean.iter().zip(y) {
            assert!((predicted - actual).abs() < 1.0);
        }
        for std in posterior.std {
            assert!(std < 0.01);
        }
    }

    #[rstest]
    fn uncertainty_grows_away_from_observations() {
        let model = GpModel::fit(&[0.0, 1.0], &[600.0, 700.0], 0.15, 1e-6);
        let posterior = model.posterior(&[0.0, 0.5]);
        assert!(posterior.std[1] > posterior.std[0]);
        assert!(posterior.std[1] > 0.5);
    }

    #[rstest]
    fn duplicate_inputs_fall_back_to_empirical_moments() {
        // Two identical inputs with zero jitter make the kernel singular.
        let model = GpModel::fit(&[0.5, 0.5], &[600.0, 800.0], 0.15, 0.0);
        let posterior = model.posterior(&[0.1, 0.9]);
        assert!((posterior.mean[0] - 700.0).abs() < 1e-9);
        assert!((posterior.std[0] - 100.0).abs() < 1e-9);
    }

    #[rstest]
    fn expected_improvement_is_zero_without_uncertainty() {
        assert_eq!(expected_improvement(500.0, 0.0, 600.0, 5.0), 0.0);
    }

    #[rstest]
    fn expected_improvement_prefers_lower_predicted_means() {
        let better = expected_improvement(500.0, 50.0, 600.0, 5.0);
        let worse = expected_improvement(590.0, 50.0, 600.0, 5.0);
        assert!(better > worse);
        assert!(better > 0.0);
    }

    #[rstest]
    fn non_improving_means_score_zero_despite_high_uncertainty() {
        assert_eq!(expected_improvement(900.0, 500.0, 600.0, 5.0), 0.0);
        assert_eq!(expected_improvement(596.0, 500.0, 600.0, 5.0), 0.0);
    }
}
