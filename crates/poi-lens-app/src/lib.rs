//! poi-lens-app: terminal stand-in for the camera overlay
//!
//! Loads configuration, builds the selected place source, replays a short
//! simulated walk with a turning compass through the update coordinator and
//! prints every published set of marker placements and every alert.

pub mod cli;
pub mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use poi_lens_config::{OverlayConfig, PlaceSourceKind};
use poi_lens_core::input::{
    sensor_events, HeadingProvider, LocationOptions, LocationProvider, SensorEvent,
    SimulatedHeadingProvider, SimulatedLocationProvider,
};
use poi_lens_core::{
    Alert, GeoPoint, Heading, MarkerPlacement, OverlayState, PlaceSource, RadiusControl,
    SearchRadius, StaticPlaceSource, UpdateCoordinator,
};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

pub use cli::Args;

/// Compass ticks per simulated location fix
const TICKS_PER_FIX: usize = 4;
/// Northward step of the simulated walk, in degrees of latitude (~5.5 m)
const WALK_STEP_DEG: f64 = 0.00005;
/// Log level used until the config file has been read
const DEFAULT_LOG_LEVEL: &str = "info";

/// Reload handle for the log filter installed by [`init_tracing`]
pub type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the fmt subscriber; `RUST_LOG` wins over `default_level`.
///
/// Returns `None` when a subscriber was already installed (e.g. by a test
/// harness).
pub fn init_tracing(default_level: &str) -> Option<LogFilterHandle> {
    let (filter, handle) = reload::Layer::new(env_filter(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok()
        .map(|()| handle)
}

/// Switch to the configured log level once the config is loaded
pub fn apply_log_level(handle: Option<&LogFilterHandle>, level: &str) {
    if let Some(handle) = handle {
        if let Err(e) = handle.reload(env_filter(level)) {
            warn!("Could not apply log level {}: {}", level, e);
        }
    }
}

/// Build the place source selected in `config`
pub fn build_source(config: &OverlayConfig) -> Result<Arc<dyn PlaceSource>> {
    match config.place_source.kind {
        PlaceSourceKind::Static => {
            let source = match &config.place_source.catalog_path {
                Some(path) => StaticPlaceSource::from_json_file(path)
                    .with_context(|| format!("loading catalog {}", path.display()))?,
                None => StaticPlaceSource::builtin(),
            };
            info!("Static place source with {} places", source.len());
            Ok(Arc::new(source))
        }
        #[cfg(feature = "overpass")]
        PlaceSourceKind::Overpass => {
            let source =
                poi_lens_core::OverpassPlaceSource::from_config(&config.place_source)?;
            info!("Overpass place source at {}", source.endpoint());
            Ok(Arc::new(source))
        }
        #[cfg(not(feature = "overpass"))]
        PlaceSourceKind::Overpass => {
            anyhow::bail!("this build does not include the overpass place source")
        }
    }
}

/// A straight walk north from `start`
fn walk_route(start: GeoPoint, fixes: usize) -> Vec<GeoPoint> {
    (0..fixes.max(1))
        .map(|i| GeoPoint::new(start.latitude + i as f64 * WALK_STEP_DEG, start.longitude))
        .collect()
}

/// Run the demo to completion
pub async fn run(args: Args) -> Result<()> {
    let log_filter = init_tracing(DEFAULT_LOG_LEVEL);
    let mut config = OverlayConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config)?;
    apply_log_level(log_filter.as_ref(), &config.logging.level);

    let state = run_with_config(&args, &config).await?;
    info!(
        "Done: {} candidates, {} markers in view at the end",
        state.candidates.len(),
        state.placements.len()
    );
    Ok(())
}

/// Replay the simulated sensors against an already loaded config.
///
/// Returns the coordinator's final state.
pub async fn run_with_config(args: &Args, config: &OverlayConfig) -> Result<OverlayState> {
    let source = build_source(config)?;
    let radius = RadiusControl::new(SearchRadius::new(config.search.radius_km));
    let (coordinator, mut handle) = UpdateCoordinator::from_config(source, config, &radius);

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let start = GeoPoint::new(args.lat, args.lon);
    let location = SimulatedLocationProvider::walking(
        walk_route(start, args.ticks.div_ceil(TICKS_PER_FIX)),
        tick * TICKS_PER_FIX as u32,
    );
    let compass = SimulatedHeadingProvider::sweep(
        Heading::new(args.heading),
        args.sweep,
        args.ticks,
        tick,
    );

    // Keep the coordinator alive long enough for the last debounced refresh
    let settle = Duration::from_millis(config.updates.debounce_ms) + tick;
    let settle = futures::stream::once(tokio::time::sleep(settle))
        .filter_map(|()| async { None::<SensorEvent> });
    let events = sensor_events(
        location.subscribe(LocationOptions::from(&config.location)),
        compass.start(config.updates.heading_update_rate_deg),
    )
    .chain(settle)
    .boxed();

    info!(
        "Replaying {} compass ticks from {} at {} within {}",
        args.ticks,
        start,
        Heading::new(args.heading),
        radius.get()
    );

    let mut printer = FramePrinter::new(args.json, config.viewport.screen_width_px);
    let mut runner = tokio::spawn(coordinator.run(events));
    let mut placements_open = true;
    let mut alerts_open = true;

    let state = loop {
        tokio::select! {
            biased;
            changed = handle.placements.changed(), if placements_open => match changed {
                Ok(()) => {
                    let placements = handle.placements.borrow_and_update().clone();
                    printer.print(placements)?;
                }
                Err(_) => placements_open = false,
            },
            alert = handle.alerts.recv(), if alerts_open => match alert {
                Some(alert) => print_alert(args.json, &alert)?,
                None => alerts_open = false,
            },
            finished = &mut runner => break finished.context("coordinator task failed")?,
        }
    };

    let latest = handle.placements.borrow_and_update().clone();
    printer.print_if_new(latest)?;
    while let Ok(alert) = handle.alerts.try_recv() {
        print_alert(args.json, &alert)?;
    }

    Ok(state)
}

/// Numbers and prints published placement lists
struct FramePrinter {
    json: bool,
    screen_width_px: f64,
    frame: usize,
    last: Option<Vec<MarkerPlacement>>,
}

impl FramePrinter {
    fn new(json: bool, screen_width_px: f64) -> Self {
        Self {
            json,
            screen_width_px,
            frame: 0,
            last: None,
        }
    }

    fn print(&mut self, placements: Vec<MarkerPlacement>) -> Result<()> {
        self.frame += 1;
        if self.json {
            println!("{}", serde_json::to_string(&placements)?);
        } else {
            print!(
                "{}",
                render::render_placements(self.frame, &placements, self.screen_width_px)
            );
        }
        self.last = Some(placements);
        Ok(())
    }

    /// Print unless it repeats the previous frame
    fn print_if_new(&mut self, placements: Vec<MarkerPlacement>) -> Result<()> {
        let unchanged = match &self.last {
            Some(last) => *last == placements,
            None => placements.is_empty(),
        };
        if unchanged {
            return Ok(());
        }
        self.print(placements)
    }
}

fn print_alert(json: bool, alert: &Alert) -> Result<()> {
    if json {
        let line = serde_json::json!({ "alert": alert });
        eprintln!("{}", line);
    } else {
        eprintln!("{}", render::render_alert(alert));
    }
    Ok(())
}
