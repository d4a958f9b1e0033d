//! Typed sensor events

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{OverlayError, Resource};
use crate::spatial::{GeoPoint, Heading};

/// A GPS fix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFix {
    pub point: GeoPoint,
    /// Horizontal accuracy radius in meters, when reported
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    /// A fix taken right now
    pub fn now(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// What a location subscription delivers: a fix or a provider failure
pub type LocationUpdate = Result<LocationFix, OverlayError>;

/// Unified input event for the update coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// New GPS fix
    Location(LocationFix),
    /// New compass sample
    Heading(Heading),
    /// The location provider reported an error
    LocationFailed(OverlayError),
    /// A required permission was refused
    PermissionDenied(Resource),
}

impl SensorEvent {
    /// Map a location subscription item onto a sensor event
    pub fn from_location_update(update: LocationUpdate) -> Self {
        match update {
            Ok(fix) => SensorEvent::Location(fix),
            Err(OverlayError::PermissionDenied(resource)) => SensorEvent::PermissionDenied(resource),
            Err(error) => SensorEvent::LocationFailed(error),
        }
    }

    pub fn is_location(&self) -> bool {
        matches!(self, SensorEvent::Location(_))
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, SensorEvent::Heading(_))
    }

    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SensorEvent::LocationFailed(_) | SensorEvent::PermissionDenied(_)
        )
    }
}

impl From<Heading> for SensorEvent {
    fn from(heading: Heading) -> Self {
        SensorEvent::Heading(heading)
    }
}

impl From<LocationFix> for SensorEvent {
    fn from(fix: LocationFix) -> Self {
        SensorEvent::Location(fix)
    }
}
