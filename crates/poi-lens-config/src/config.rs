//! Overlay configuration model, loading and validation

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest search radius the user can select (km)
pub const MIN_SEARCH_RADIUS_KM: f64 = 0.1;
/// Largest search radius the user can select (km)
pub const MAX_SEARCH_RADIUS_KM: f64 = 5.0;
/// Increment of the radius control (km)
pub const SEARCH_RADIUS_STEP_KM: f64 = 0.5;

/// Public Overpass interpreter endpoint
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which place source backs the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSourceKind {
    /// Compiled-in catalog (or a JSON catalog file)
    #[default]
    Static,
    /// Live OpenStreetMap query through Overpass
    Overpass,
}

impl PlaceSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceSourceKind::Static => "static",
            PlaceSourceKind::Overpass => "overpass",
        }
    }
}

impl fmt::Display for PlaceSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" | "local" => Ok(PlaceSourceKind::Static),
            "overpass" | "remote" => Ok(PlaceSourceKind::Overpass),
            other => Err(ConfigError::Invalid(format!(
                "unknown place source '{}', expected 'static' or 'overpass'",
                other
            ))),
        }
    }
}

/// Search radius settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Initial search radius in kilometers
    pub radius_km: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { radius_km: 1.0 }
    }
}

/// Place source selection and remote query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceSourceConfig {
    pub kind: PlaceSourceKind,
    /// Overpass interpreter URL
    pub overpass_url: String,
    /// Client-side HTTP timeout
    pub request_timeout_secs: u64,
    /// Tag consulted when an element has no `name`
    pub name_fallback_tag: String,
    /// Optional JSON catalog replacing the built-in static places
    pub catalog_path: Option<PathBuf>,
}

impl Default for PlaceSourceConfig {
    fn default() -> Self {
        Self {
            kind: PlaceSourceKind::Static,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            request_timeout_secs: 30,
            name_fallback_tag: "name:tr".to_string(),
            catalog_path: None,
        }
    }
}

/// Camera frustum and screen geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Assumed horizontal angle of view of the camera (degrees)
    pub field_of_view_deg: f64,
    /// Overlay width in pixels
    pub screen_width_px: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            field_of_view_deg: 60.0,
            screen_width_px: 390.0,
        }
    }
}

/// Marker layout tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Side of a collision grid cell in pixels
    pub cell_size_px: f64,
    /// Vertical offset of a marker at distance zero
    pub base_vertical_px: f64,
    /// Extra vertical offset per kilometer
    pub vertical_px_per_km: f64,
    /// Scale lost per kilometer
    pub scale_falloff_per_km: f64,
    /// Opacity lost per kilometer
    pub opacity_falloff_per_km: f64,
    /// Floor for both scale and opacity
    pub min_emphasis: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size_px: 80.0,
            base_vertical_px: 100.0,
            vertical_px_per_km: 30.0,
            scale_falloff_per_km: 0.05,
            opacity_falloff_per_km: 0.1,
            min_emphasis: 0.8,
        }
    }
}

/// Rate limiting of candidate refreshes and heading sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Trailing-edge debounce window for place source calls
    pub debounce_ms: u64,
    /// Longest a steady stream of triggers may postpone a refresh (None = unbounded)
    pub max_wait_ms: Option<u64>,
    /// Minimum compass change (degrees) before a heading sample is forwarded
    pub heading_update_rate_deg: f64,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            max_wait_ms: Some(3000),
            heading_update_rate_deg: 3.0,
        }
    }
}

/// Options handed to the location provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_age_ms: u64,
    pub min_distance_m: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 20_000,
            max_age_ms: 1_000,
            min_distance_m: 0.0,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OverlayConfig {
    pub search: SearchConfig,
    pub place_source: PlaceSourceConfig,
    pub viewport: ViewportConfig,
    pub layout: LayoutConfig,
    pub updates: UpdatesConfig,
    pub location: LocationConfig,
    pub logging: LoggingConfig,
}

impl OverlayConfig {
    /// Default config file path in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "poi-lens", "poi-lens")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load, apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one the default path is tried and
    /// silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Apply `POI_LENS_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("POI_LENS_PLACE_SOURCE") {
            self.place_source.kind = kind.parse()?;
        }
        if let Some(url) = lookup("POI_LENS_OVERPASS_URL") {
            self.place_source.overpass_url = url;
        }
        if let Some(radius) = lookup("POI_LENS_RADIUS_KM") {
            self.search.radius_km = radius.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("POI_LENS_RADIUS_KM is not a number: {}", radius))
            })?;
        }
        if let Some(level) = lookup("POI_LENS_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Reject values the overlay cannot work with
    pub fn validate(&self) -> Result<()> {
        let radius = self.search.radius_km;
        if !(MIN_SEARCH_RADIUS_KM..=MAX_SEARCH_RADIUS_KM).contains(&radius) {
            return Err(ConfigError::Invalid(format!(
                "search.radius_km must be within [{}, {}], got {}",
                MIN_SEARCH_RADIUS_KM, MAX_SEARCH_RADIUS_KM, radius
            )));
        }

        let fov = self.viewport.field_of_view_deg;
        if !(fov > 0.0 && fov <= 180.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport.field_of_view_deg must be within (0, 180], got {}",
                fov
            )));
        }
        if self.viewport.screen_width_px <= 0.0 {
            return Err(ConfigError::Invalid(
                "viewport.screen_width_px must be positive".to_string(),
            ));
        }
        if self.layout.cell_size_px <= 0.0 {
            return Err(ConfigError::Invalid(
                "layout.cell_size_px must be positive".to_string(),
            ));
        }
        if self.updates.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "updates.debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.updates.heading_update_rate_deg < 0.0 {
            return Err(ConfigError::Invalid(
                "updates.heading_update_rate_deg cannot be negative".to_string(),
            ));
        }
        if self.place_source.kind == PlaceSourceKind::Overpass
            && self.place_source.overpass_url.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "place_source.overpass_url is required for the overpass source".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = OverlayConfig::from_toml_str("").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.search.radius_km, 1.0);
        assert_eq!(config.updates.debounce_ms, 1000);
        assert_eq!(config.viewport.field_of_view_deg, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = OverlayConfig::from_toml_str(
            r#"
            [place_source]
            kind = "overpass"

            [layout]
            cell_size_px = 64.0
            "#,
        )
        .unwrap();

        assert_eq!(config.place_source.kind, PlaceSourceKind::Overpass);
        assert_eq!(config.place_source.overpass_url, DEFAULT_OVERPASS_URL);
        assert_eq!(config.layout.cell_size_px, 64.0);
        assert_eq!(config.layout.base_vertical_px, 100.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nradius_km = 2.5").unwrap();

        let config = OverlayConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.search.radius_km, 2.5);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = OverlayConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_radius_out_of_range_rejected() {
        let mut config = OverlayConfig::default();
        config.search.radius_km = 7.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.search.radius_km = 0.05;
        assert!(config.validate().is_err());

        config.search.radius_km = MAX_SEARCH_RADIUS_KM;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_of_view_rejected() {
        let mut config = OverlayConfig::default();
        config.viewport.field_of_view_deg = 0.0;
        assert!(config.validate().is_err());
        config.viewport.field_of_view_deg = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("POI_LENS_PLACE_SOURCE", "remote"),
            ("POI_LENS_RADIUS_KM", "3.5"),
            ("POI_LENS_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = OverlayConfig::default();
        config
            .apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.place_source.kind, PlaceSourceKind::Overpass);
        assert_eq!(config.search.radius_km, 3.5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_override() {
        let mut config = OverlayConfig::default();
        let result = config.apply_overrides_from(|key| {
            (key == "POI_LENS_RADIUS_KM").then(|| "far".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("Static".parse::<PlaceSourceKind>().unwrap(), PlaceSourceKind::Static);
        assert_eq!("overpass".parse::<PlaceSourceKind>().unwrap(), PlaceSourceKind::Overpass);
        assert!("google".parse::<PlaceSourceKind>().is_err());
    }
}
