//! Latitude/longitude points and great-circle math

use std::fmt;

use serde::{Deserialize, Serialize};

use super::angle::normalize_degrees;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(*self, *other)
    }

    /// Forward azimuth towards `other`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        initial_bearing_deg(*self, *other)
    }

    /// Whether both coordinates are finite and inside their ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two points in kilometers
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial bearing (forward azimuth) from `from` to `to`, in [0, 360)
///
/// When both points coincide the direction is undefined; the value returned
/// is whatever `atan2(0, 0)` yields and must not be relied upon.
pub fn initial_bearing_deg(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANKARA: GeoPoint = GeoPoint::new(39.9, 32.8);
    const MALTEPE: GeoPoint = GeoPoint::new(40.9199, 29.1275);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_km(ANKARA, ANKARA), 0.0);
        assert_eq!(MALTEPE.distance_km(&MALTEPE), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let points = [
            ANKARA,
            MALTEPE,
            GeoPoint::new(-33.86, 151.21),
            GeoPoint::new(51.5, -0.12),
            GeoPoint::new(0.0, 179.9),
            GeoPoint::new(0.0, -179.9),
        ];
        for a in points {
            for b in points {
                let ab = distance_km(a, b);
                let ba = distance_km(b, a);
                assert!((ab - ba).abs() < 1e-9, "{a} -> {b}: {ab} vs {ba}");
                assert!(ab >= 0.0);
            }
        }
    }

    #[test]
    fn test_known_distance() {
        // Anıtkabir to Maltepe is roughly 350 km as the crow flies
        let anitkabir = GeoPoint::new(39.925533, 32.836417);
        let d = distance_km(MALTEPE, anitkabir);
        assert!(d > 300.0 && d < 400.0, "Expected ~350 km, got {d}");

        // One degree of latitude is about 111.2 km
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "Expected ~111.19 km, got {d}");
    }

    #[test]
    fn test_antimeridian_distance_is_short() {
        let d = distance_km(GeoPoint::new(0.0, 179.9), GeoPoint::new(0.0, -179.9));
        assert!(d < 25.0, "Expected ~22 km, got {d}");
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!(initial_bearing_deg(origin, GeoPoint::new(1.0, 0.0)).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        let bearing = MALTEPE.bearing_to(&GeoPoint::new(40.9150, 29.1200));
        assert!((0.0..360.0).contains(&bearing));
        // South-west of the origin
        assert!(bearing > 180.0 && bearing < 270.0, "got {bearing}");
    }

    #[test]
    fn test_validity() {
        assert!(ANKARA.is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
