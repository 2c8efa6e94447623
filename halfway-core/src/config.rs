//! Search configuration.
//!
//! Every tunable the engine consults lives in [`SearchConfig`], passed by
//! reference into each search call. There is no module-level mutable state;
//! whether the Gaussian-process searcher is available is decided once at
//! composition time (a cargo feature plus [`SearchConfig::use_surrogate`]),
//! not probed per call.

/// Tunables for the deterministic coarse-to-fine searcher.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchConfig {
    /// Sample count for the first (full-window) round.
    pub initial_samples: usize,
    /// Sample count for each refinement round.
    pub refinement_samples: usize,
    /// Number of refinement rounds after the initial round.
    pub refinement_rounds: usize,
    /// Window multiplier applied between rounds.
    pub shrink_factor: f64,
    /// Stop when the window is narrower than this fraction of the route.
    pub min_window: f64,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            initial_samples: 21,
            refinement_samples: 15,
            refinement_rounds: 3,
            shrink_factor: 0.5,
            min_window: 0.01,
        }
    }
}

/// Tunables for the Gaussian-process searcher.
#[derive(Debug, Clone, PartialEq)]
pub struct BayesConfig {
    /// Evenly spaced seed evaluations before the first acquisition step.
    pub seed_samples: usize,
    /// Iteration budget when searching the whole route.
    pub global_iterations: usize,
    /// Iteration budget per local refinement window.
    pub local_iterations: usize,
    /// Points selected per iteration during global search.
    pub global_batch_size: usize,
    /// Points selected per iteration during local refinement.
    pub local_batch_size: usize,
    /// RBF kernel length scale for global search.
    pub global_length_scale: f64,
    /// RBF kernel length scale for local refinement.
    pub local_length_scale: f64,
    /// Diagonal jitter added to the training covariance.
    pub noise: f64,
    /// Acquisition grid resolution for global search.
    pub global_grid_points: usize,
    /// Acquisition grid resolution per local window.
    pub local_grid_points: usize,
    /// Exploration margin subtracted from the incumbent, in seconds.
    pub ei_xi_seconds: f64,
    /// Fractions closer than this to an already-tried point are skipped.
    pub tried_tolerance: f64,
    /// Minimum separation between batch picks, as a fraction of the window.
    pub batch_separation_factor: f64,
    /// Early-stop window: number of trailing observations examined.
    pub convergence_window: usize,
    /// Early-stop threshold on the trailing standard deviation, in seconds.
    pub convergence_std_seconds: f64,
    /// Observations required before early stopping is considered.
    pub min_history_for_stop: usize,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            seed_samples: 8,
            global_iterations: 25,
            local_iterations: 8,
            global_batch_size: 1,
            local_batch_size: 3,
            global_length_scale: 0.15,
            local_length_scale: 0.05,
            noise: 1e-6,
            global_grid_points: 200,
            local_grid_points: 100,
            ei_xi_seconds: 5.0,
            tried_tolerance: 1e-4,
            batch_separation_factor: 0.005,
            convergence_window: 5,
            convergence_std_seconds: 30.0,
            min_history_for_stop: 10,
        }
    }
}

/// Tunables for visualisation thinning.
#[derive(Debug, Clone, PartialEq)]
pub struct ThinningConfig {
    /// Evaluations within this route-fraction tolerance of a kept one are
    /// dropped.
    pub fraction_tolerance: f64,
    /// Minimum great-circle separation between kept points, in metres.
    pub min_spacing_m: f64,
}

impl Default for ThinningConfig {
    fn default() -> Self {
        Self {
            fraction_tolerance: 0.002,
            min_spacing_m: 300.0,
        }
    }
}

/// Tunables for the venue ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueConfig {
    /// Venue search radius around the chosen meeting point, in metres.
    pub radius_m: u32,
    /// Weight on travel-time fairness in the composite score.
    pub fairness_weight: f64,
    /// Weight on total travel time in the composite score.
    pub efficiency_weight: f64,
    /// Number of ranked alternatives to keep alongside the best venue.
    pub alternatives: usize,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            radius_m: 2000,
            fairness_weight: 0.7,
            efficiency_weight: 0.3,
            alternatives: 5,
        }
    }
}

/// Configuration for one meeting-point search.
///
/// # Examples
/// ```
/// use halfway_core::SearchConfig;
///
/// let config = SearchConfig::default().with_top_k_refine(4);
/// assert_eq!(config.top_k_refine, 4);
/// assert_eq!(config.lateral_offsets_m, vec![-400.0, 0.0, 400.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Evenly spaced route fractions in the global sweep.
    pub global_fractions: usize,
    /// Lateral offsets probed at each global sweep fraction, in metres.
    pub lateral_offsets_m: Vec<f64>,
    /// Smaller lateral probes used during local refinement, in metres.
    pub refine_lateral_offsets_m: Vec<f64>,
    /// Decimal places used when deduplicating candidate coordinates.
    pub dedup_decimals: u32,
    /// Number of top-ranked fractions seeded into local refinement.
    pub top_k_refine: usize,
    /// Half-width of each local refinement window, in route fraction.
    pub local_window_half_width: f64,
    /// Cap on sequential pairwise lookups when the matrix call fails.
    pub pairwise_fallback_limit: usize,
    /// Prefer the Gaussian-process searcher when it is compiled in.
    pub use_surrogate: bool,
    /// Deterministic searcher tunables.
    pub grid: GridSearchConfig,
    /// Gaussian-process searcher tunables.
    pub bayes: BayesConfig,
    /// Visualisation thinning tunables.
    pub thinning: ThinningConfig,
    /// Venue ranking tunables.
    pub venue: VenueConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            global_fractions: 50,
            lateral_offsets_m: vec![-400.0, 0.0, 400.0],
            refine_lateral_offsets_m: vec![-200.0, 0.0, 200.0],
            dedup_decimals: 6,
            top_k_refine: 6,
            local_window_half_width: 0.06,
            pairwise_fallback_limit: 8,
            use_surrogate: true,
            grid: GridSearchConfig::default(),
            bayes: BayesConfig::default(),
            thinning: ThinningConfig::default(),
            venue: VenueConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Set the number of local refinement seeds.
    #[must_use]
    pub fn with_top_k_refine(mut self, top_k: usize) -> Self {
        self.top_k_refine = top_k;
        self
    }

    /// Set the global sweep resolution.
    #[must_use]
    pub fn with_global_fractions(mut self, fractions: usize) -> Self {
        self.global_fractions = fractions;
        self
    }

    /// Enable or disable the Gaussian-process searcher.
    ///
    /// Has no effect when the `surrogate` feature is not compiled into
    /// `halfway-search`; the deterministic searcher is used either way.
    #[must_use]
    pub fn with_surrogate(mut self, enabled: bool) -> Self {
        self.use_surrogate = enabled;
        self
    }
}
