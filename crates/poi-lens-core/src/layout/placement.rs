//! Placement engine: candidate places to on-screen marker descriptors

use poi_lens_config::OverlayConfig;
use serde::Serialize;
use tracing::trace;

use super::grid::{CollisionGrid, GridCell};
use crate::place::Place;
use crate::spatial::{GeoPoint, Heading, Viewport};

/// Where and how to draw one place marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub place: Place,
    /// Bearing from the user to the place, in [0, 360)
    pub bearing_deg: f64,
    /// Distance from the left screen edge
    pub horizontal_offset_px: f64,
    /// Distance from the top screen edge
    pub vertical_offset_px: f64,
    /// Size multiplier, nearer is larger
    pub scale: f64,
    /// Alpha, nearer is more opaque
    pub opacity: f64,
    /// Grid cell claimed by this marker
    pub cell: GridCell,
}

/// Placements farthest first, so nearer markers are drawn last (on top)
pub fn draw_order(placements: &[MarkerPlacement]) -> impl Iterator<Item = &MarkerPlacement> {
    placements.iter().rev()
}

/// Lays out visible places for the current location and heading
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    viewport: Viewport,
    cell_size_px: f64,
    base_vertical_px: f64,
    vertical_px_per_km: f64,
    scale_falloff_per_km: f64,
    opacity_falloff_per_km: f64,
    min_emphasis: f64,
}

impl PlacementEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cell_size_px: 80.0,
            base_vertical_px: 100.0,
            vertical_px_per_km: 30.0,
            scale_falloff_per_km: 0.05,
            opacity_falloff_per_km: 0.1,
            min_emphasis: 0.8,
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        let layout = &config.layout;
        Self {
            viewport: Viewport::from(&config.viewport),
            cell_size_px: layout.cell_size_px,
            base_vertical_px: layout.base_vertical_px,
            vertical_px_per_km: layout.vertical_px_per_km,
            scale_falloff_per_km: layout.scale_falloff_per_km,
            opacity_falloff_per_km: layout.opacity_falloff_per_km,
            min_emphasis: layout.min_emphasis,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Scale for a place at `distance_km`
    pub fn scale_for(&self, distance_km: f64) -> f64 {
        (1.0 - distance_km * self.scale_falloff_per_km).max(self.min_emphasis)
    }

    /// Opacity for a place at `distance_km`
    pub fn opacity_for(&self, distance_km: f64) -> f64 {
        (1.0 - distance_km * self.opacity_falloff_per_km).max(self.min_emphasis)
    }

    /// Preferred vertical position before collision resolution
    fn preferred_vertical_px(&self, distance_km: f64) -> f64 {
        self.base_vertical_px + distance_km * self.vertical_px_per_km
    }

    /// Visible places as markers, nearest first, no two sharing a grid cell
    pub fn place(
        &self,
        places: &[Place],
        location: GeoPoint,
        heading: Heading,
    ) -> Vec<MarkerPlacement> {
        let mut visible: Vec<(f64, &Place)> = places
            .iter()
            .map(|place| (location.bearing_to(&place.location), place))
            .filter(|(bearing, _)| self.viewport.contains(*bearing, heading))
            .collect();

        // Nearer places claim cells first
        visible.sort_by(|a, b| a.1.distance_km.total_cmp(&b.1.distance_km));

        let mut grid = CollisionGrid::new(self.cell_size_px);
        visible
            .into_iter()
            .map(|(bearing, place)| {
                let horizontal = self.viewport.horizontal_offset_px(bearing, heading);
                let preferred =
                    grid.cell_at(horizontal, self.preferred_vertical_px(place.distance_km));
                let cell = grid.claim(preferred);
                trace!(
                    "{} at bearing {:.1} -> cell ({}, {})",
                    place.name,
                    bearing,
                    cell.column,
                    cell.row
                );

                MarkerPlacement {
                    place: place.clone(),
                    bearing_deg: bearing,
                    horizontal_offset_px: horizontal,
                    vertical_offset_px: grid.row_top_px(cell),
                    scale: self.scale_for(place.distance_km),
                    opacity: self.opacity_for(place.distance_km),
                    cell,
                }
            })
            .collect()
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}
