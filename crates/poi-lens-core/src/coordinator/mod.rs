//! Update coordination
//!
//! Location and heading events are applied through a single dispatch path.
//! Heading changes re-run the layout immediately against cached candidates;
//! place source calls go through a trailing-edge [`Debouncer`] so a burst of
//! sensor events results in one call with the most recent location.

mod debounce;
mod overlay;
mod radius;

pub use debounce::Debouncer;
pub use overlay::{OverlayHandle, OverlayState, UpdateCoordinator};
pub use radius::RadiusControl;
