//! Simulated sensors for development without a device
//!
//! Replays a scripted list of fixes or compass samples at a fixed interval,
//! applying the same gating a real provider would.

use std::time::Duration;

use async_stream::stream;
use chrono::Utc;
use tracing::debug;

use super::event::{LocationFix, LocationUpdate};
use super::filter::{FixFilter, HeadingGate};
use super::provider::{HeadingProvider, LocationOptions, LocationProvider, Subscription};
use crate::spatial::{GeoPoint, Heading};

const SUBSCRIPTION_BUFFER: usize = 16;
/// Horizontal accuracy reported on simulated walking fixes
const SIMULATED_ACCURACY_M: f64 = 5.0;

/// Replays location updates (fixes or failures) at a fixed interval
#[derive(Debug, Clone)]
pub struct SimulatedLocationProvider {
    script: Vec<LocationUpdate>,
    interval: Duration,
}

impl SimulatedLocationProvider {
    pub fn scripted(script: Vec<LocationUpdate>, interval: Duration) -> Self {
        Self { script, interval }
    }

    /// Walk along `route`, one fix per interval
    pub fn walking(route: Vec<GeoPoint>, interval: Duration) -> Self {
        let script = route
            .into_iter()
            .map(|p| Ok(LocationFix::now(p).with_accuracy(SIMULATED_ACCURACY_M)))
            .collect();
        Self::scripted(script, interval)
    }

    /// Stand still at `point` for `count` fixes
    pub fn stationary(point: GeoPoint, count: usize, interval: Duration) -> Self {
        Self::walking(vec![point; count], interval)
    }
}

impl LocationProvider for SimulatedLocationProvider {
    fn subscribe(&self, options: LocationOptions) -> Subscription<LocationUpdate> {
        let script = self.script.clone();
        let interval = self.interval;
        let mut filter = FixFilter::from(&options);

        let updates = stream! {
            let mut ticker = tokio::time::interval(interval);
            for update in script {
                ticker.tick().await;
                match update {
                    Ok(fix) => {
                        // Replayed fixes are stamped at delivery time
                        let fix = fix.with_timestamp(Utc::now());
                        if filter.accept(&fix, Utc::now()) {
                            yield Ok(fix);
                        }
                    }
                    Err(error) => yield Err(error),
                }
            }
            debug!("Simulated location script finished");
        };

        Subscription::spawn(updates, SUBSCRIPTION_BUFFER)
    }
}

/// Replays compass samples at a fixed interval
#[derive(Debug, Clone)]
pub struct SimulatedHeadingProvider {
    samples: Vec<Heading>,
    interval: Duration,
}

impl SimulatedHeadingProvider {
    pub fn scripted(samples: Vec<Heading>, interval: Duration) -> Self {
        Self { samples, interval }
    }

    /// Turn from `start` by `step_deg` per sample
    pub fn sweep(start: Heading, step_deg: f64, count: usize, interval: Duration) -> Self {
        let samples = (0..count)
            .map(|i| start.rotated(step_deg * i as f64))
            .collect();
        Self::scripted(samples, interval)
    }
}

impl HeadingProvider for SimulatedHeadingProvider {
    fn start(&self, update_rate_deg: f64) -> Subscription<Heading> {
        let samples = self.samples.clone();
        let interval = self.interval;
        let mut gate = HeadingGate::new(update_rate_deg);

        let headings = stream! {
            let mut ticker = tokio::time::interval(interval);
            for sample in samples {
                ticker.tick().await;
                if let Some(heading) = gate.accept(sample) {
                    yield heading;
                }
            }
        };

        Subscription::spawn(headings, SUBSCRIPTION_BUFFER)
    }
}
