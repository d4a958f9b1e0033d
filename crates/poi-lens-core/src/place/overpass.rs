//! OpenStreetMap place source via the Overpass API
//!
//! Issues one Overpass QL query per call: nodes and ways within the search
//! radius that carry any of a fixed set of POI tags. Elements that cannot be
//! turned into a [`Place`] are dropped individually.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use poi_lens_config::PlaceSourceConfig;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{sort_by_distance, Place, PlaceError, PlaceResult, PlaceSource, SearchRadius, UNCATEGORIZED};
use crate::spatial::GeoPoint;

const DEFAULT_OVERPASS_URL: &str = poi_lens_config::config::DEFAULT_OVERPASS_URL;
const USER_AGENT: &str = concat!("poi-lens/", env!("CARGO_PKG_VERSION"));

/// Server-side query timeout embedded in the query text
const QUERY_TIMEOUT_SECS: u32 = 25;

/// Placeholder for elements without any usable name
pub const UNNAMED_PLACE: &str = "Unnamed place";

/// Tags consulted, in order, for a place's representative category
const CATEGORY_KEYS: [&str; 4] = ["shop", "amenity", "tourism", "leisure"];

/// Overpass tag filters: shops, restaurants, cafés, parks, schools,
/// hospitals, banks, transit stops, malls, hotels, pharmacies
pub const OVERPASS_TAG_FILTERS: [&str; 11] = [
    r#"["shop"]"#,
    r#"["amenity"="restaurant"]"#,
    r#"["amenity"="cafe"]"#,
    r#"["leisure"="park"]"#,
    r#"["amenity"="school"]"#,
    r#"["amenity"="hospital"]"#,
    r#"["amenity"="bank"]"#,
    r#"["public_transport"="stop_position"]"#,
    r#"["shop"="mall"]"#,
    r#"["tourism"="hotel"]"#,
    r#"["amenity"="pharmacy"]"#,
];

/// Build the Overpass QL query for a radius search around `center`
pub fn build_query(center: GeoPoint, radius: SearchRadius) -> String {
    let around = format!(
        "(around:{:.0},{},{})",
        radius.meters(),
        center.latitude,
        center.longitude
    );

    let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_SECS);
    for filter in OVERPASS_TAG_FILTERS {
        for element in ["node", "way"] {
            // Writing into a String cannot fail
            let _ = writeln!(query, "  {}{}{};", element, filter, around);
        }
    }
    query.push_str(");\nout center;");
    query
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    id: Option<i64>,
    lat: Option<f64>,
    lon: Option<f64>,
    /// Present on ways when the query ends with `out center`
    center: Option<LatLon>,
    tags: Option<BTreeMap<String, String>>,
}

impl OverpassElement {
    fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{}/{}", self.kind, id),
            None => self.kind.clone(),
        }
    }

    fn location(&self) -> Option<GeoPoint> {
        let point = match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => GeoPoint::new(lat, lon),
            (_, _, Some(center)) => GeoPoint::new(center.lat, center.lon),
            _ => return None,
        };
        point.is_valid().then_some(point)
    }
}

fn element_name(tags: &BTreeMap<String, String>, fallback_tag: &str) -> String {
    [tags.get("name"), tags.get(fallback_tag)]
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
        .unwrap_or(UNNAMED_PLACE)
        .to_string()
}

fn element_category(tags: &BTreeMap<String, String>) -> String {
    CATEGORY_KEYS
        .iter()
        .find_map(|key| tags.get(*key))
        .cloned()
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

fn element_to_place(
    value: serde_json::Value,
    center: GeoPoint,
    fallback_tag: &str,
) -> PlaceResult<Place> {
    let element: OverpassElement =
        serde_json::from_value(value).map_err(|e| PlaceError::MalformedElement(e.to_string()))?;

    let location = element.location().ok_or_else(|| {
        PlaceError::MalformedElement(format!("{} has no coordinates", element.label()))
    })?;
    let tags = element
        .tags
        .as_ref()
        .filter(|tags| !tags.is_empty())
        .ok_or_else(|| PlaceError::MalformedElement(format!("{} has no tags", element.label())))?;

    let name = element_name(tags, fallback_tag);
    let category = element_category(tags);
    Ok(Place::measured_from(center, name, location, vec![category]).with_attributes(tags.clone()))
}

/// Turn an Overpass JSON body into places within `radius`, nearest first.
///
/// Fails only when the body as a whole is not an Overpass response;
/// malformed elements are skipped.
pub fn parse_response(
    body: &str,
    center: GeoPoint,
    radius: SearchRadius,
    fallback_tag: &str,
) -> PlaceResult<Vec<Place>> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| PlaceError::Parse(e.to_string()))?;

    let total = response.elements.len();
    let mut places = Vec::with_capacity(total);
    for value in response.elements {
        match element_to_place(value, center, fallback_tag) {
            Ok(place) => places.push(place),
            Err(e) => debug!("Skipping Overpass element: {}", e),
        }
    }

    // The around filter is evaluated server-side against element geometry,
    // not the centers we measure from
    places.retain(|place| radius.contains(place.distance_km));
    sort_by_distance(&mut places);

    debug!("Overpass response: kept {} of {} elements", places.len(), total);
    Ok(places)
}

/// Place source querying an Overpass interpreter
#[derive(Debug, Clone)]
pub struct OverpassPlaceSource {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// Interpreter endpoint
    endpoint: String,
    /// Tag consulted when an element has no `name`
    name_fallback_tag: String,
}

impl OverpassPlaceSource {
    /// Create a source against the public Overpass endpoint
    pub fn new() -> PlaceResult<Self> {
        Self::with_endpoint(DEFAULT_OVERPASS_URL, Duration::from_secs(30))
    }

    /// Create a source against a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> PlaceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PlaceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            name_fallback_tag: "name:tr".to_string(),
        })
    }

    /// Build from the `[place_source]` config section
    pub fn from_config(config: &PlaceSourceConfig) -> PlaceResult<Self> {
        Ok(Self::with_endpoint(
            config.overpass_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_name_fallback_tag(config.name_fallback_tag.clone()))
    }

    /// Set the tag used when `name` is missing (e.g. `name:en`)
    pub fn with_name_fallback_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_fallback_tag = tag.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlaceSource for OverpassPlaceSource {
    async fn fetch_candidates(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
    ) -> PlaceResult<Vec<Place>> {
        let query = build_query(center, radius);
        info!("Querying Overpass for places within {} of {}", radius, center);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| PlaceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Overpass returned HTTP {}", status);
            return Err(PlaceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlaceError::Network(e.to_string()))?;

        parse_response(&body, center, radius, &self.name_fallback_tag)
    }

    fn name(&self) -> &'static str {
        "overpass"
    }
}
