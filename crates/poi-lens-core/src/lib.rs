//! poi-lens-core: geospatial projection core for camera POI overlays
//!
//! Turns a device location, a compass heading and a set of candidate places
//! into screen-space marker placements:
//! - Great-circle geo math and a field-of-view test
//! - Interchangeable place sources (static catalog, Overpass/OpenStreetMap)
//! - Marker layout with grid-based collision avoidance
//! - Typed sensor subscriptions for location and heading streams
//! - An update coordinator with a debounced candidate refresh

pub mod coordinator;
pub mod error;
pub mod input;
pub mod layout;
pub mod place;
pub mod spatial;

// Re-export commonly used types
pub use coordinator::{Debouncer, OverlayHandle, OverlayState, RadiusControl, UpdateCoordinator};
pub use error::{Alert, OverlayError, Resource};
pub use input::{
    HeadingProvider, LocationFix, LocationOptions, LocationProvider, SensorEvent, Subscription,
};
pub use layout::{MarkerPlacement, PlacementEngine};
pub use place::{Place, PlaceError, PlaceSource, SearchRadius, StaticPlaceSource};
#[cfg(feature = "overpass")]
pub use place::OverpassPlaceSource;
pub use spatial::{GeoPoint, Heading, Viewport};

pub use poi_lens_config as config;
