//! Candidate places and the sources that supply them
//!
//! A [`PlaceSource`] answers "what is within `radius` of `center`?". Every
//! returned [`Place`] carries its distance from the querying location, and
//! that distance never exceeds the requested radius.

mod catalog;
#[cfg(feature = "overpass")]
mod overpass;
mod radius;
mod static_source;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::spatial::GeoPoint;

pub use catalog::{builtin_catalog, CatalogEntry};
#[cfg(feature = "overpass")]
pub use overpass::{build_query, parse_response, OverpassPlaceSource, OVERPASS_TAG_FILTERS};
pub use radius::SearchRadius;
pub use static_source::StaticPlaceSource;

/// Category reported when a place carries no usable tag
pub const UNCATEGORIZED: &str = "other";

/// A point of interest relative to a query location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub location: GeoPoint,
    /// Category tags, most representative first
    pub categories: Vec<String>,
    /// Distance from the location the place was queried for
    pub distance_km: f64,
    /// Free-form tags (OpenStreetMap tags for remote places)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Place {
    /// Create a place measured from `center`
    pub fn measured_from(
        center: GeoPoint,
        name: impl Into<String>,
        location: GeoPoint,
        categories: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            categories,
            distance_km: center.distance_km(&location),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// The first category, or "other"
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }
}

/// Sort places nearest first
pub(crate) fn sort_by_distance(places: &mut [Place]) {
    places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

/// Errors produced by place sources
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaceError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("place service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not parse place response: {0}")]
    Parse(String),

    /// A single element was unusable; sources skip these instead of failing
    #[error("malformed element: {0}")]
    MalformedElement(String),
}

pub type PlaceResult<T> = Result<T, PlaceError>;

/// Supplies candidate places around a location
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Fetch places within `radius` of `center`, nearest first
    async fn fetch_candidates(&self, center: GeoPoint, radius: SearchRadius)
        -> PlaceResult<Vec<Place>>;

    /// Name of this source (for logging)
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_category_fallback() {
        let center = GeoPoint::new(40.0, 29.0);
        let place = Place::measured_from(center, "Somewhere", center, Vec::new());
        assert_eq!(place.primary_category(), UNCATEGORIZED);
        assert_eq!(place.distance_km, 0.0);

        let cafe = Place::measured_from(
            center,
            "Cafe",
            GeoPoint::new(40.001, 29.0),
            vec!["kafe".to_string(), "kahve".to_string()],
        );
        assert_eq!(cafe.primary_category(), "kafe");
        assert!(cafe.distance_km > 0.1 && cafe.distance_km < 0.12);
    }

    #[test]
    fn test_sort_by_distance() {
        let center = GeoPoint::new(40.0, 29.0);
        let mut places = vec![
            Place::measured_from(center, "far", GeoPoint::new(40.01, 29.0), Vec::new()),
            Place::measured_from(center, "near", GeoPoint::new(40.001, 29.0), Vec::new()),
            Place::measured_from(center, "here", center, Vec::new()),
        ];
        sort_by_distance(&mut places);
        let names: Vec<_> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["here", "near", "far"]);
    }
}
