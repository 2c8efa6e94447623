//! Geodesic distance, bearing, and lateral-offset helpers.
//!
//! Vertex-to-vertex route distances use the `geo` crate's [`Geodesic`]
//! metric (ellipsoidal, Vincenty-class). Bearings and perpendicular offsets
//! use the [`Haversine`] sphere, which is accurate to well under a metre at
//! the few-hundred-metre offsets this engine probes. Neither routine is
//! suitable for continental-scale geometry.

use geo::{Bearing, Destination, Distance, Geodesic, Haversine, Point};

use crate::GeoPoint;

/// Geodesic distance between two coordinates in metres.
#[must_use]
pub fn geodesic_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    Geodesic.distance(Point::from(a), Point::from(b))
}

/// Great-circle (haversine) distance between two coordinates in metres.
///
/// Cheaper than [`geodesic_meters`]; used for spatial spacing checks where
/// millimetre accuracy is irrelevant.
#[must_use]
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// Forward azimuth from `a` to `b` in radians.
///
/// Spherical approximation; adequate at city and regional scale, not
/// geodesically exact over long arcs.
#[must_use]
pub fn bearing_radians(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine
        .bearing(Point::from(a), Point::from(b))
        .to_radians()
}

/// Displace `p` perpendicular to `bearing_rad` by a signed distance in
/// metres.
///
/// Positive distances move to the right of the direction of travel,
/// negative to the left. A zero distance returns `p` unchanged.
#[must_use]
pub fn offset_point(p: GeoPoint, bearing_rad: f64, distance_m: f64) -> GeoPoint {
    if distance_m == 0.0 {
        return p;
    }
    let quarter_turn = if distance_m > 0.0 { 90.0 } else { -90.0 };
    let perp = bearing_rad.to_degrees() + quarter_turn;
    Haversine
        .destination(Point::from(p), perp, distance_m.abs())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn bearing_points_north_along_meridian() {
        let b = bearing_radians(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!(b.abs() < 1e-6, "expected ~0 rad, got {b}");
    }

    #[rstest]
    fn bearing_points_east_along_equator() {
        let b = bearing_radians(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((b - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[rstest]
    fn offset_moves_perpendicular_by_requested_distance() {
        let origin = GeoPoint::new(52.5, 13.4);
        // Travelling north; a +400 m offset should land due east.
        let moved = offset_point(origin, 0.0, 400.0);
        let d = haversine_meters(origin, moved);
        assert!((d - 400.0).abs() < 1.0, "distance {d}");
        assert!(moved.lng > origin.lng);
        assert!((moved.lat - origin.lat).abs() < 1e-4);
    }

    #[rstest]
    fn negative_offset_mirrors_positive() {
        let origin = GeoPoint::new(52.5, 13.4);
        let right = offset_point(origin, 0.0, 400.0);
        let left = offset_point(origin, 0.0, -400.0);
        assert!(left.lng < origin.lng && right.lng > origin.lng);
        let d = haversine_meters(left, right);
        assert!((d - 800.0).abs() < 2.0, "span {d}");
    }

    #[rstest]
    fn zero_offset_is_identity() {
        let origin = GeoPoint::new(1.0, 2.0);
        assert_eq!(offset_point(origin, 1.25, 0.0), origin);
    }

    #[rstest]
    fn geodesic_and_haversine_agree_at_city_scale() {
        let a = GeoPoint::new(52.52, 13.405);
        let b = GeoPoint::new(52.50, 13.42);
        let g = geodesic_meters(a, b);
        let h = haversine_meters(a, b);
        assert!((g - h).abs() / g < 0.01, "geodesic {g} vs haversine {h}");
    }
}
