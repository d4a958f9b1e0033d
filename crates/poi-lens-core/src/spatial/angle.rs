//! Compass angle helpers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wrap any angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Absolute angular distance between two bearings, in [0, 180]
///
/// `angular_difference(350.0, 10.0) == 20.0`
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Signed offset of `bearing` from `heading`, in (-180, 180]
///
/// Positive means the bearing lies clockwise (to the right) of the heading.
pub fn relative_bearing(bearing: f64, heading: f64) -> f64 {
    let diff = normalize_degrees(bearing - heading);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Device compass heading, always in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Heading(f64);

impl Heading {
    pub const NORTH: Heading = Heading(0.0);

    pub fn new(degrees: f64) -> Self {
        Self(normalize_degrees(degrees))
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Angular distance to another heading, in [0, 180]
    pub fn difference(&self, other: Heading) -> f64 {
        angular_difference(self.0, other.0)
    }

    /// Rotate clockwise by `delta` degrees (negative rotates counter-clockwise)
    pub fn rotated(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl From<f64> for Heading {
    fn from(degrees: f64) -> Self {
        Self::new(degrees)
    }
}

impl From<Heading> for f64 {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03.0}°", self.0)
    }
}
