//! Camera field-of-view test and bearing-to-screen mapping

use poi_lens_config::ViewportConfig;

use super::angle::{angular_difference, relative_bearing};
use super::Heading;

/// Assumed horizontal angle of view of a phone camera
pub const DEFAULT_FIELD_OF_VIEW_DEG: f64 = 60.0;

/// True iff `bearing` lies within half the field of view of `heading`
pub fn is_visible(bearing: f64, heading: f64, field_of_view_deg: f64) -> bool {
    angular_difference(bearing, heading) <= field_of_view_deg / 2.0
}

/// Horizontal frustum of the camera mapped onto a screen of known width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal field of view in degrees
    pub field_of_view_deg: f64,
    /// Screen width in pixels
    pub screen_width_px: f64,
}

impl Viewport {
    pub fn new(field_of_view_deg: f64, screen_width_px: f64) -> Self {
        Self {
            field_of_view_deg,
            screen_width_px,
        }
    }

    pub fn half_angle(&self) -> f64 {
        self.field_of_view_deg / 2.0
    }

    /// Check if a bearing is visible while facing `heading`
    pub fn contains(&self, bearing: f64, heading: Heading) -> bool {
        is_visible(bearing, heading.degrees(), self.field_of_view_deg)
    }

    /// Map a bearing onto the screen: the left frustum edge is 0, the right
    /// edge is `screen_width_px`, the heading itself lands in the middle.
    pub fn horizontal_offset_px(&self, bearing: f64, heading: Heading) -> f64 {
        let offset = relative_bearing(bearing, heading.degrees());
        ((offset + self.half_angle()) / self.field_of_view_deg) * self.screen_width_px
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_OF_VIEW_DEG, 390.0)
    }
}

impl From<&ViewportConfig> for Viewport {
    fn from(config: &ViewportConfig) -> Self {
        Self::new(config.field_of_view_deg, config.screen_width_px)
    }
}
