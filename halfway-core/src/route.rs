//! Transit routes and their arc-length parameterisation.

use serde::{Deserialize, Serialize};

use crate::geometry::{bearing_radians, geodesic_meters, offset_point};
use crate::{Candidate, GeoPoint};

/// A transit route between two origins, as returned by the route provider.
///
/// Owned by the search call that requested it and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRoute {
    /// Decoded route geometry, in travel order.
    pub points: Vec<GeoPoint>,
    /// Total route distance in metres.
    pub distance_meters: f64,
    /// Total transit duration in seconds.
    pub duration_seconds: f64,
    /// The provider's compact encoded geometry, kept for display payloads.
    pub encoded_geometry: String,
}

/// Arc-length parameterised view of a route polyline.
///
/// Precomputes cumulative geodesic distances so positions along the route
/// can be addressed by a fraction of total length in `[0, 1]`.
///
/// # Examples
/// ```
/// use halfway_core::{GeoPoint, RouteGeometry};
///
/// let geometry = RouteGeometry::new(vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, 1.0),
///     GeoPoint::new(0.0, 2.0),
/// ]);
/// let start = geometry.point_at_fraction(0.0);
/// assert_eq!(start, GeoPoint::new(0.0, 0.0));
/// let end = geometry.point_at_fraction(1.0);
/// assert_eq!(end, GeoPoint::new(0.0, 2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    points: Vec<GeoPoint>,
    /// `cumulative[i]` is the distance in metres from the first vertex to
    /// vertex `i`; `cumulative[0] == 0`.
    cumulative: Vec<f64>,
    total_meters: f64,
}

impl RouteGeometry {
    /// Build the parameterisation for an ordered point sequence.
    #[must_use]
    pub fn new(points: Vec<GeoPoint>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if let Some(prev) = i.checked_sub(1).and_then(|p| points.get(p)) {
                total += geodesic_meters(*prev, *point);
            }
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            total_meters: total,
        }
    }

    /// Build the parameterisation for a provider route.
    #[must_use]
    pub fn from_route(route: &TransitRoute) -> Self {
        Self::new(route.points.clone())
    }

    /// The route's vertices in travel order.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Total arc length in metres.
    #[must_use]
    pub fn total_meters(&self) -> f64 {
        self.total_meters
    }

    /// Whether the route has no usable extent (empty, single point, or zero
    /// length). Degenerate routes are searched as a single candidate.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() <= 1 || self.total_meters == 0.0
    }

    /// The first vertex, if any.
    #[must_use]
    pub fn first_point(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    /// The point at `frac` of total arc length, interpolated linearly
    /// between the bracketing vertices.
    ///
    /// Degenerate routes return their sole point; an empty route returns the
    /// coordinate origin (callers check [`Self::is_degenerate`] first).
    /// Fractions outside `[0, 1]` are clamped.
    #[must_use]
    pub fn point_at_fraction(&self, frac: f64) -> GeoPoint {
        let Some(&first) = self.points.first() else {
            return GeoPoint::new(0.0, 0.0);
        };
        if self.is_degenerate() {
            return first;
        }
        let target = frac.clamp(0.0, 1.0) * self.total_meters;
        let seg = self.segment_index(target);
        let Some((&a, &b)) = self.points.get(seg).zip(self.points.get(seg + 1)) else {
            return self.points.last().copied().unwrap_or(first);
        };
        let seg_start = self.cumulative.get(seg).copied().unwrap_or(0.0);
        let seg_end = self
            .cumulative
            .get(seg + 1)
            .copied()
            .unwrap_or(self.total_meters);
        let seg_len = seg_end - seg_start;
        let inner = if seg_len == 0.0 {
            0.0
        } else {
            (target - seg_start) / seg_len
        };
        GeoPoint::new(a.lat + (b.lat - a.lat) * inner, a.lng + (b.lng - a.lng) * inner)
    }

    /// Forward bearing of the route segment containing `frac`, in radians.
    #[must_use]
    pub fn bearing_at_fraction(&self, frac: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let target = frac.clamp(0.0, 1.0) * self.total_meters;
        let seg = self.segment_index(target);
        match self.points.get(seg).zip(self.points.get(seg + 1)) {
            Some((&a, &b)) => bearing_radians(a, b),
            None => 0.0,
        }
    }

    /// Build a candidate at `frac` along the route, displaced laterally by
    /// `offset_m` metres perpendicular to the local bearing.
    #[must_use]
    pub fn candidate_at(&self, frac: f64, offset_m: f64) -> Candidate {
        let base = self.point_at_fraction(frac);
        if offset_m == 0.0 {
            return Candidate::on_route(base, frac);
        }
        let bearing = self.bearing_at_fraction(frac);
        Candidate::new(offset_point(base, bearing, offset_m), frac, offset_m)
    }

    /// Index of the segment whose far endpoint is the first vertex at or
    /// beyond `target` metres, clamped to the last segment.
    fn segment_index(&self, target: f64) -> usize {
        let upper = self.cumulative.partition_point(|&c| c < target);
        upper.saturating_sub(1).min(self.points.len().saturating_sub(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn straight_route() -> RouteGeometry {
        RouteGeometry::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, 2.0),
        ])
    }

    #[rstest]
    fn cumulative_starts_at_zero_and_reaches_total(straight_route: RouteGeometry) {
        assert_eq!(straight_route.cumulative.first(), Some(&0.0));
        assert_eq!(
            straight_route.cumulative.last(),
            Some(&straight_route.total_meters())
        );
        assert!(straight_route.total_meters() > 0.0);
    }

    #[rstest]
    fn fraction_zero_is_first_point(straight_route: RouteGeometry) {
        assert_eq!(
            straight_route.point_at_fraction(0.0),
            GeoPoint::new(0.0, 0.0)
        );
    }

    #[rstest]
    fn fraction_one_is_last_point(straight_route: RouteGeometry) {
        assert_eq!(
            straight_route.point_at_fraction(1.0),
            GeoPoint::new(0.0, 2.0)
        );
    }

    #[rstest]
    fn midpoint_of_equatorial_line_lands_between_vertices(straight_route: RouteGeometry) {
        let mid = straight_route.point_at_fraction(0.5);
        assert!((mid.lat - 0.0).abs() < 1e-9);
        assert!((mid.lng - 1.0).abs() < 1e-3, "lng {}", mid.lng);
    }

    #[rstest]
    fn out_of_range_fractions_are_clamped(straight_route: RouteGeometry) {
        assert_eq!(
            straight_route.point_at_fraction(-0.5),
            straight_route.point_at_fraction(0.0)
        );
        assert_eq!(
            straight_route.point_at_fraction(1.5),
            straight_route.point_at_fraction(1.0)
        );
    }

    #[rstest]
    fn single_point_route_is_degenerate() {
        let geometry = RouteGeometry::new(vec![GeoPoint::new(5.0, 5.0)]);
        assert!(geometry.is_degenerate());
        assert_eq!(geometry.point_at_fraction(0.7), GeoPoint::new(5.0, 5.0));
    }

    #[rstest]
    fn repeated_point_route_has_zero_length() {
        let geometry =
            RouteGeometry::new(vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0, 1.0)]);
        assert!(geometry.is_degenerate());
        assert_eq!(geometry.total_meters(), 0.0);
    }

    #[rstest]
    fn candidate_with_offset_leaves_the_route_line(straight_route: RouteGeometry) {
        let on_route = straight_route.candidate_at(0.5, 0.0);
        let offset = straight_route.candidate_at(0.5, 400.0);
        assert_eq!(on_route.lateral_offset_m, 0.0);
        assert_eq!(offset.lateral_offset_m, 400.0);
        assert_ne!(on_route.point, offset.point);
        let d = crate::geometry::haversine_meters(on_route.point, offset.point);
        assert!((d - 400.0).abs() < 1.0, "offset distance {d}");
    }

    #[rstest]
    fn bearing_along_equator_is_eastward(straight_route: RouteGeometry) {
        let b = straight_route.bearing_at_fraction(0.25);
        assert!((b - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }
}
