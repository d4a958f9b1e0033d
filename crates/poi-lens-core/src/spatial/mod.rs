//! Spatial primitives for compass-driven overlays
//!
//! Angles are degrees clockwise from true north. Bearings and headings are
//! normalized into [0, 360); signed offsets live in (-180, 180].

mod angle;
mod geo_point;
mod viewport;

pub use angle::{angular_difference, normalize_degrees, relative_bearing, Heading};
pub use geo_point::{distance_km, initial_bearing_deg, GeoPoint, EARTH_RADIUS_KM};
pub use viewport::{is_visible, Viewport, DEFAULT_FIELD_OF_VIEW_DEG};
