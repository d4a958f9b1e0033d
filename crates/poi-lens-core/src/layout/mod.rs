//! Screen-space layout of place markers

mod grid;
mod placement;

pub use grid::{CollisionGrid, GridCell};
pub use placement::{draw_order, MarkerPlacement, PlacementEngine};
