//! Global candidate generation over a route.

use std::collections::HashSet;

use halfway_core::{Candidate, GeoPoint, RouteGeometry, SearchConfig};

/// Produce the global sweep of candidates: evenly spaced route fractions,
/// each probed at the configured lateral offsets.
///
/// Candidates whose coordinates coincide after rounding (streets crossing
/// back on themselves, overlapping offsets at sharp bends) are deduplicated,
/// keeping the first occurrence. A degenerate route yields its sole point as
/// a single on-route candidate.
///
/// # Examples
/// ```
/// use halfway_core::{GeoPoint, RouteGeometry, SearchConfig};
/// use halfway_search::generate_global_candidates;
///
/// let geometry = RouteGeometry::new(vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, 1.0),
/// ]);
/// let config = SearchConfig::default();
/// let candidates = generate_global_candidates(&geometry, &config);
/// assert_eq!(
///     candidates.len(),
///     config.global_fractions * config.lateral_offsets_m.len()
/// );
/// ```
#[must_use]
pub fn generate_global_candidates(
    geometry: &RouteGeometry,
    config: &SearchConfig,
) -> Vec<Candidate> {
    if geometry.points().is_empty() {
        return Vec::new();
    }
    if geometry.is_degenerate() {
        return geometry
            .first_point()
            .map(|p| vec![Candidate::on_route(p, 0.0)])
            .unwrap_or_default();
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for frac in evenly_spaced(0.0, 1.0, config.global_fractions) {
        for &offset in &config.lateral_offsets_m {
            let candidate = geometry.candidate_at(frac, offset);
            if seen.insert(rounded_key(candidate.point, config.dedup_decimals)) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// `n` evenly spaced values across `[start, end]`, endpoints included.
///
/// `n <= 1` collapses to the interval midpoint.
pub(crate) fn evenly_spaced(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![(start + end) / 2.0];
    }
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| start + (end - start) * (i as f64) / last)
        .collect()
}

/// Integer dedup key from coordinates rounded to `decimals` places.
pub(crate) fn rounded_key(point: GeoPoint, decimals: u32) -> (i64, i64) {
    let scale = 10f64.powi(decimals.min(9) as i32);
    (
        (point.lat * scale).round() as i64,
        (point.lng * scale).round() as i64,
    )
}
