//! Sample gating applied before events reach the coordinator

use chrono::{DateTime, Utc};
use tracing::trace;

use super::event::LocationFix;
use super::provider::LocationOptions;
use crate::spatial::{GeoPoint, Heading};

/// Forwards a heading only once it moved by at least `update_rate_deg`
#[derive(Debug, Clone)]
pub struct HeadingGate {
    update_rate_deg: f64,
    last: Option<Heading>,
}

impl HeadingGate {
    pub fn new(update_rate_deg: f64) -> Self {
        Self {
            update_rate_deg: update_rate_deg.max(0.0),
            last: None,
        }
    }

    /// Returns the heading when it should be forwarded
    pub fn accept(&mut self, heading: Heading) -> Option<Heading> {
        match self.last {
            Some(last) if heading.difference(last) < self.update_rate_deg => {
                trace!("Heading {} within {}° of {}", heading, self.update_rate_deg, last);
                None
            }
            _ => {
                self.last = Some(heading);
                Some(heading)
            }
        }
    }
}

/// Drops stale fixes and fixes that moved less than the minimum distance
#[derive(Debug, Clone)]
pub struct FixFilter {
    max_age_ms: i64,
    min_distance_m: f64,
    last: Option<GeoPoint>,
}

impl FixFilter {
    pub fn new(max_age_ms: u64, min_distance_m: f64) -> Self {
        Self {
            max_age_ms: i64::try_from(max_age_ms).unwrap_or(i64::MAX),
            min_distance_m,
            last: None,
        }
    }

    pub fn accept(&mut self, fix: &LocationFix, now: DateTime<Utc>) -> bool {
        let age_ms = (now - fix.timestamp).num_milliseconds();
        if age_ms > self.max_age_ms {
            trace!("Dropping fix {}ms old", age_ms);
            return false;
        }

        if let Some(last) = self.last {
            if last.distance_km(&fix.point) * 1000.0 < self.min_distance_m {
                return false;
            }
        }

        self.last = Some(fix.point);
        true
    }
}

impl From<&LocationOptions> for FixFilter {
    fn from(options: &LocationOptions) -> Self {
        Self::new(options.max_age_ms, options.min_distance_m)
    }
}
