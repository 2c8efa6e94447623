use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A point considered as a potential meeting location.
///
/// Candidates are value objects: once created they are never mutated, only
/// accumulated into [`Evaluation`] records.
///
/// # Examples
/// ```
/// use halfway_core::{Candidate, GeoPoint};
///
/// let c = Candidate::on_route(GeoPoint::new(52.5, 13.4), 0.5);
/// assert_eq!(c.route_fraction, 0.5);
/// assert_eq!(c.lateral_offset_m, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The candidate's coordinate.
    pub point: GeoPoint,
    /// Position along the route by arc length, in `[0, 1]`.
    pub route_fraction: f64,
    /// Signed perpendicular displacement from the route line in metres;
    /// zero means on-route.
    pub lateral_offset_m: f64,
}

impl Candidate {
    /// Construct a candidate.
    #[must_use]
    pub const fn new(point: GeoPoint, route_fraction: f64, lateral_offset_m: f64) -> Self {
        Self {
            point,
            route_fraction,
            lateral_offset_m,
        }
    }

    /// Construct an on-route candidate (zero lateral offset).
    #[must_use]
    pub const fn on_route(point: GeoPoint, route_fraction: f64) -> Self {
        Self::new(point, route_fraction, 0.0)
    }
}

/// Travel-time measurements for one candidate from both origins.
///
/// An `Evaluation` only exists when *both* travel times resolved; partial
/// provider responses are dropped by the evaluator rather than stored with
/// missing fields. The derived fields are computed on construction, so
/// `max_travel_time_s == max(t1, t2)` and `time_difference_s == |t1 - t2|`
/// hold by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The evaluated candidate.
    pub candidate: Candidate,
    /// Transit seconds from the first origin.
    pub time_from_origin1_s: f64,
    /// Transit seconds from the second origin.
    pub time_from_origin2_s: f64,
    /// The minimax objective: the larger of the two travel times.
    pub max_travel_time_s: f64,
    /// Absolute difference between the two travel times.
    pub time_difference_s: f64,
    /// Sum of the two travel times.
    pub total_travel_time_s: f64,
}

impl Evaluation {
    /// Build an evaluation from the two resolved travel times.
    ///
    /// # Examples
    /// ```
    /// use halfway_core::{Candidate, Evaluation, GeoPoint};
    ///
    /// let c = Candidate::on_route(GeoPoint::new(0.0, 0.0), 0.5);
    /// let e = Evaluation::new(c, 600.0, 1200.0);
    /// assert_eq!(e.max_travel_time_s, 1200.0);
    /// assert_eq!(e.time_difference_s, 600.0);
    /// assert_eq!(e.total_travel_time_s, 1800.0);
    /// ```
    #[must_use]
    pub fn new(candidate: Candidate, time_from_origin1_s: f64, time_from_origin2_s: f64) -> Self {
        Self {
            candidate,
            time_from_origin1_s,
            time_from_origin2_s,
            max_travel_time_s: time_from_origin1_s.max(time_from_origin2_s),
            time_difference_s: (time_from_origin1_s - time_from_origin2_s).abs(),
            total_travel_time_s: time_from_origin1_s + time_from_origin2_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(600.0, 1200.0)]
    #[case(1200.0, 600.0)]
    #[case(900.0, 900.0)]
    fn derived_fields_honour_invariants(#[case] t1: f64, #[case] t2: f64) {
        let candidate = Candidate::on_route(GeoPoint::new(0.0, 0.0), 0.25);
        let eval = Evaluation::new(candidate, t1, t2);
        assert_eq!(eval.max_travel_time_s, t1.max(t2));
        assert_eq!(eval.time_difference_s, (t1 - t2).abs());
        assert_eq!(eval.total_travel_time_s, t1 + t2);
    }
}
