//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use poi_lens_config::{ConfigError, OverlayConfig, PlaceSourceKind};

/// Replay a simulated walk with a turning compass and print the overlay
#[derive(Parser, Debug, Clone)]
#[command(name = "poi-lens-demo")]
#[command(version)]
#[command(about = "Drive the POI overlay core with simulated location and compass streams")]
pub struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Place source: static or overpass
    #[arg(long)]
    pub source: Option<PlaceSourceKind>,

    /// Search radius in kilometers
    #[arg(long)]
    pub radius: Option<f64>,

    /// Starting latitude
    #[arg(long, default_value_t = 40.9199, allow_hyphen_values = true)]
    pub lat: f64,

    /// Starting longitude
    #[arg(long, default_value_t = 29.1275, allow_hyphen_values = true)]
    pub lon: f64,

    /// Initial compass heading in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub heading: f64,

    /// Degrees the compass turns per tick
    #[arg(long, default_value_t = 15.0, allow_hyphen_values = true)]
    pub sweep: f64,

    /// Number of compass samples to replay
    #[arg(long, default_value_t = 24)]
    pub ticks: usize,

    /// Milliseconds between compass samples
    #[arg(long, default_value_t = 250)]
    pub tick_ms: u64,

    /// Print JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded config
    pub fn apply_to(&self, config: &mut OverlayConfig) -> Result<(), ConfigError> {
        if let Some(kind) = self.source {
            config.place_source.kind = kind;
        }
        if let Some(radius) = self.radius {
            config.search.radius_km = radius;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["poi-lens-demo"]);
        assert_eq!(args.lat, 40.9199);
        assert_eq!(args.ticks, 24);
        assert!(args.source.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_overrides_applied_and_validated() {
        let args = Args::parse_from(["poi-lens-demo", "--source", "overpass", "--radius", "2.5"]);
        let mut config = OverlayConfig::default();
        args.apply_to(&mut config).unwrap();
        assert_eq!(config.place_source.kind, PlaceSourceKind::Overpass);
        assert_eq!(config.search.radius_km, 2.5);

        let args = Args::parse_from(["poi-lens-demo", "--radius", "9"]);
        assert!(args.apply_to(&mut OverlayConfig::default()).is_err());
    }

    #[test]
    fn test_negative_coordinates() {
        let args = Args::parse_from(["poi-lens-demo", "--lat", "-33.86", "--lon", "151.2"]);
        assert_eq!(args.lat, -33.86);
    }

    #[test]
    fn test_negative_heading_and_sweep() {
        let args = Args::parse_from(["poi-lens-demo", "--heading", "-10", "--sweep", "-5"]);
        assert_eq!(args.heading, -10.0);
        assert_eq!(args.sweep, -5.0);
    }
}
