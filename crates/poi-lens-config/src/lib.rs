//! poi-lens-config: configuration for the poi-lens overlay core
//!
//! Settings are read from a TOML file (platform config dir by default),
//! then adjusted by `POI_LENS_*` environment variables, then validated.
//! Every field has a default, so a missing or empty file is a valid config.

pub mod config;

pub use config::{
    ConfigError, LayoutConfig, LocationConfig, LoggingConfig, OverlayConfig, PlaceSourceConfig,
    PlaceSourceKind, SearchConfig, UpdatesConfig, ViewportConfig,
};
