//! Place source backed by a fixed in-memory catalog

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{sort_by_distance, CatalogEntry, Place, PlaceError, PlaceResult, PlaceSource, SearchRadius};
use crate::spatial::GeoPoint;

/// Filters a fixed list of named locations by distance
#[derive(Debug, Clone)]
pub struct StaticPlaceSource {
    entries: Vec<CatalogEntry>,
}

impl StaticPlaceSource {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Source over the compiled-in catalog
    pub fn builtin() -> Self {
        Self::new(super::builtin_catalog())
    }

    /// Parse a JSON array of catalog entries
    pub fn from_json(json: &str) -> PlaceResult<Self> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(json).map_err(|e| PlaceError::Parse(e.to_string()))?;
        Ok(Self::new(entries))
    }

    /// Read a JSON catalog from disk
    pub fn from_json_file(path: &Path) -> PlaceResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PlaceError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synchronous lookup; the async trait method delegates here
    pub fn nearby(&self, center: GeoPoint, radius: SearchRadius) -> Vec<Place> {
        let mut places: Vec<Place> = self
            .entries
            .iter()
            .map(|entry| {
                Place::measured_from(
                    center,
                    entry.name.clone(),
                    entry.location,
                    entry.categories.clone(),
                )
            })
            .filter(|place| radius.contains(place.distance_km))
            .collect();

        sort_by_distance(&mut places);
        debug!(
            "Static catalog: {} of {} places within {} of {}",
            places.len(),
            self.entries.len(),
            radius,
            center
        );
        places
    }
}

impl Default for StaticPlaceSource {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl PlaceSource for StaticPlaceSource {
    async fn fetch_candidates(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
    ) -> PlaceResult<Vec<Place>> {
        Ok(self.nearby(center, radius))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
