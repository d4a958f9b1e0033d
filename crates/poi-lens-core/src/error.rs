//! Overlay failure taxonomy and user-facing alerts
//!
//! No failure is fatal: each one becomes a single [`Alert`] and the overlay
//! keeps its last known good state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::place::PlaceError;

/// A device capability that needs user permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Camera,
    Location,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Camera => f.write_str("camera"),
            Resource::Location => f.write_str("location"),
        }
    }
}

/// Errors surfaced to the user
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("{0} permission denied")]
    PermissionDenied(Resource),

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error(transparent)]
    PlaceSource(#[from] PlaceError),
}

impl OverlayError {
    /// Short alert title
    pub fn title(&self) -> &'static str {
        match self {
            OverlayError::PermissionDenied(Resource::Camera) => "Camera permission required",
            OverlayError::PermissionDenied(Resource::Location) => "Location permission required",
            OverlayError::LocationUnavailable(_) => "Location error",
            OverlayError::PlaceSource(_) => "Could not load nearby places",
        }
    }
}

/// A one-shot user-facing notification of a failure
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(error: &OverlayError) -> Self {
        Self {
            title: error.title().to_string(),
            message: error.to_string(),
            raised_at: Utc::now(),
        }
    }
}

impl From<&OverlayError> for Alert {
    fn from(error: &OverlayError) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
