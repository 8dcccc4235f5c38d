//! Geographic primitives shared by the graph, locator, and heuristic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Whether both components are finite and within the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance between two points given in degrees.
///
/// Returns meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against `a` drifting past 1.0 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = Coordinates::new(51.5, -0.12);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn one_hundredth_degree_on_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 0.01);
        let d = a.distance_to(&b);
        // 0.01 degrees of arc on the equator is ~1111.95 m.
        assert!((d - 1111.95).abs() < 0.1, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates::new(48.8566, 2.3522);
        let b = Coordinates::new(52.52, 13.405);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
        // Paris to Berlin is roughly 878 km.
        assert!((a.distance_to(&b) / 1000.0 - 878.0).abs() < 5.0);
    }

    #[test]
    fn validity_rejects_out_of_range() {
        assert!(Coordinates::new(45.0, 90.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
