//! User-adjustable search radius

use std::fmt;

use poi_lens_config::config::{MAX_SEARCH_RADIUS_KM, MIN_SEARCH_RADIUS_KM, SEARCH_RADIUS_STEP_KM};
use serde::{Deserialize, Serialize};

/// Search radius in kilometers, clamped to [0.1, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct SearchRadius(f64);

impl SearchRadius {
    pub const MIN: SearchRadius = SearchRadius(MIN_SEARCH_RADIUS_KM);
    pub const MAX: SearchRadius = SearchRadius(MAX_SEARCH_RADIUS_KM);
    pub const STEP_KM: f64 = SEARCH_RADIUS_STEP_KM;

    /// Clamp `km` into the allowed range (NaN becomes the minimum)
    pub fn new(km: f64) -> Self {
        if km.is_nan() {
            return Self::MIN;
        }
        Self(km.clamp(MIN_SEARCH_RADIUS_KM, MAX_SEARCH_RADIUS_KM))
    }

    pub fn km(&self) -> f64 {
        self.0
    }

    pub fn meters(&self) -> f64 {
        self.0 * 1000.0
    }

    /// One control step wider
    pub fn step_up(&self) -> Self {
        Self::new(self.0 + Self::STEP_KM)
    }

    /// One control step narrower
    pub fn step_down(&self) -> Self {
        Self::new(self.0 - Self::STEP_KM)
    }

    /// Whether a distance falls inside this radius
    pub fn contains(&self, distance_km: f64) -> bool {
        distance_km <= self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for SearchRadius {
    fn from(km: f64) -> Self {
        Self::new(km)
    }
}

impl From<SearchRadius> for f64 {
    fn from(radius: SearchRadius) -> Self {
        radius.0
    }
}

impl fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        assert_eq!(SearchRadius::new(0.0).km(), 0.1);
        assert_eq!(SearchRadius::new(12.0).km(), 5.0);
        assert_eq!(SearchRadius::new(f64::NAN), SearchRadius::MIN);
        assert_eq!(SearchRadius::new(2.0).meters(), 2000.0);
    }

    #[test]
    fn test_steps_stay_in_range() {
        let mut radius = SearchRadius::new(4.0);
        radius = radius.step_up();
        assert_eq!(radius.km(), 4.5);
        radius = radius.step_up().step_up();
        assert_eq!(radius, SearchRadius::MAX);

        let low = SearchRadius::new(0.3).step_down();
        assert_eq!(low, SearchRadius::MIN);
    }

    #[test]
    fn test_contains() {
        let radius = SearchRadius::new(1.0);
        assert!(radius.contains(0.0));
        assert!(radius.contains(1.0));
        assert!(!radius.contains(1.0001));
    }
}
