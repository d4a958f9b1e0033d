//! poi-lens: nearby points of interest projected onto a camera view
//!
//! Facade over the workspace crates. See [`engine`] for the geospatial and
//! placement engine and [`config`] for the configuration model.

pub use poi_lens_config as config;
pub use poi_lens_core as engine;

pub use poi_lens_core::{
    Alert, GeoPoint, Heading, MarkerPlacement, OverlayError, OverlayHandle, OverlayState,
    Place, PlaceError, PlaceSource, PlacementEngine, RadiusControl, SearchRadius,
    StaticPlaceSource, UpdateCoordinator, Viewport,
};
#[cfg(feature = "overpass")]
pub use poi_lens_core::OverpassPlaceSource;
