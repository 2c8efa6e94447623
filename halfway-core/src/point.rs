use geo::Point;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
///
/// Immutable value type; every routine that derives a new position returns a
/// fresh `GeoPoint` rather than mutating an existing one.
///
/// # Examples
/// ```
/// use halfway_core::GeoPoint;
///
/// let berlin = GeoPoint::new(52.52, 13.405);
/// assert_eq!(berlin.lat, 52.52);
/// assert_eq!(berlin.lng, 13.405);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Arithmetic midpoint of two coordinates in degree space.
    ///
    /// Used as the fallback meeting point when no transit route is available.
    /// Averaging degrees is adequate at city scale and away from the
    /// antimeridian; it is not a great-circle midpoint.
    ///
    /// # Examples
    /// ```
    /// use halfway_core::GeoPoint;
    ///
    /// let mid = GeoPoint::new(0.0, 0.0).midpoint(GeoPoint::new(2.0, 4.0));
    /// assert_eq!(mid, GeoPoint::new(1.0, 2.0));
    /// ```
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    /// Convert to a `geo` point with `x = longitude`, `y = latitude`.
    fn from(value: GeoPoint) -> Self {
        Self::new(value.lng, value.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(value: Point<f64>) -> Self {
        Self {
            lat: value.y(),
            lng: value.x(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn midpoint_averages_each_axis() {
        let a = GeoPoint::new(52.0, 13.0);
        let b = GeoPoint::new(48.0, 11.0);
        assert_eq!(a.midpoint(b), GeoPoint::new(50.0, 12.0));
    }

    #[rstest]
    fn point_conversion_round_trips() {
        let p = GeoPoint::new(51.5, -0.1);
        let geo: Point<f64> = p.into();
        assert_eq!(geo.x(), -0.1);
        assert_eq!(geo.y(), 51.5);
        assert_eq!(GeoPoint::from(geo), p);
    }
}
