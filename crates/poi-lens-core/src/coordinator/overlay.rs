//! The update coordinator: sensor events in, marker placements out

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use poi_lens_config::{OverlayConfig, UpdatesConfig};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::debounce::Debouncer;
use super::radius::RadiusControl;
use crate::error::{Alert, OverlayError};
use crate::input::SensorEvent;
use crate::layout::{MarkerPlacement, PlacementEngine};
use crate::place::{Place, PlaceResult, PlaceSource, SearchRadius};
use crate::spatial::{GeoPoint, Heading};

/// Everything the overlay knows right now
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    pub location: Option<GeoPoint>,
    pub heading: Option<Heading>,
    /// Radius used by the most recent place source call
    pub search_radius: SearchRadius,
    /// Last successfully fetched candidates
    pub candidates: Vec<Place>,
    pub placements: Vec<MarkerPlacement>,
}

impl OverlayState {
    /// Location and heading, once both are known
    pub fn pose(&self) -> Option<(GeoPoint, Heading)> {
        self.location.zip(self.heading)
    }

    /// Both inputs needed by the placement engine are known
    pub fn is_ready(&self) -> bool {
        self.pose().is_some()
    }
}

/// Receiving side of a running coordinator
pub struct OverlayHandle {
    /// Latest placements, nearest first
    pub placements: watch::Receiver<Vec<MarkerPlacement>>,
    /// One alert per failure
    pub alerts: mpsc::UnboundedReceiver<Alert>,
}

impl OverlayHandle {
    /// Snapshot of the current placements
    pub fn current(&self) -> Vec<MarkerPlacement> {
        self.placements.borrow().clone()
    }

    /// Next alert, `None` once the coordinator is gone
    pub async fn next_alert(&mut self) -> Option<Alert> {
        self.alerts.recv().await
    }
}

/// Result of one place source call, delivered back to the coordinator
#[derive(Debug)]
struct FetchOutcome {
    center: GeoPoint,
    radius: SearchRadius,
    result: PlaceResult<Vec<Place>>,
}

/// Owns the overlay state and the only path that mutates it
pub struct UpdateCoordinator {
    source: Arc<dyn PlaceSource>,
    engine: PlacementEngine,
    debouncer: Debouncer<GeoPoint>,
    state: OverlayState,
    radius: watch::Receiver<SearchRadius>,
    placements_tx: watch::Sender<Vec<MarkerPlacement>>,
    alerts_tx: mpsc::UnboundedSender<Alert>,
    completions_tx: mpsc::UnboundedSender<FetchOutcome>,
    completions_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: usize,
}

impl UpdateCoordinator {
    /// Create a coordinator with the default 1000 ms debounce window
    pub fn new(
        source: Arc<dyn PlaceSource>,
        engine: PlacementEngine,
        radius: &RadiusControl,
    ) -> (Self, OverlayHandle) {
        let (placements_tx, placements_rx) = watch::channel(Vec::new());
        let (alerts_tx, alerts_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let updates = UpdatesConfig::default();

        let coordinator = Self {
            source,
            engine,
            debouncer: debouncer_for(&updates),
            state: OverlayState {
                search_radius: radius.get(),
                ..OverlayState::default()
            },
            radius: radius.subscribe(),
            placements_tx,
            alerts_tx,
            completions_tx,
            completions_rx,
            in_flight: 0,
        };
        let handle = OverlayHandle {
            placements: placements_rx,
            alerts: alerts_rx,
        };
        (coordinator, handle)
    }

    pub fn from_config(
        source: Arc<dyn PlaceSource>,
        config: &OverlayConfig,
        radius: &RadiusControl,
    ) -> (Self, OverlayHandle) {
        let (coordinator, handle) =
            Self::new(source, PlacementEngine::from_config(config), radius);
        (coordinator.with_debouncer(debouncer_for(&config.updates)), handle)
    }

    /// Replace the rate limiter guarding place source calls
    pub fn with_debouncer(mut self, debouncer: Debouncer<GeoPoint>) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// When the pending refresh is due, if one is scheduled
    pub fn refresh_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Place source calls started but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply one sensor event
    pub fn dispatch(&mut self, event: SensorEvent, now: Instant) {
        match event {
            SensorEvent::Location(fix) => {
                debug!(
                    "Location fix {} (accuracy {:?} m)",
                    fix.point, fix.accuracy_m
                );
                self.state.location = Some(fix.point);
                self.request_refresh(now);
            }
            SensorEvent::Heading(heading) => {
                trace!("Heading {}", heading);
                self.state.heading = Some(heading);
                if self.state.location.is_some() {
                    self.relayout();
                    self.request_refresh(now);
                }
            }
            SensorEvent::LocationFailed(error) => self.raise_alert(error),
            SensorEvent::PermissionDenied(resource) => {
                self.raise_alert(OverlayError::PermissionDenied(resource))
            }
        }
    }

    /// Start the pending place source call if its deadline has passed
    pub fn fire_due(&mut self, now: Instant) {
        if let Some(center) = self.debouncer.take_due(now) {
            self.spawn_fetch(center);
        }
    }

    fn request_refresh(&mut self, now: Instant) {
        if let Some(center) = self.state.location {
            self.debouncer.trigger(center, now);
            trace!(
                "Refresh scheduled in {:?}",
                self.debouncer
                    .deadline()
                    .map(|deadline| deadline.saturating_duration_since(now))
            );
        }
    }

    fn on_radius_changed(&mut self, now: Instant) {
        let radius = *self.radius.borrow_and_update();
        info!("Search radius changed to {}", radius);
        self.request_refresh(now);
    }

    fn spawn_fetch(&mut self, center: GeoPoint) {
        let radius = *self.radius.borrow();
        self.state.search_radius = radius;
        self.in_flight += 1;

        info!(
            "Fetching places from {} around {} within {}",
            self.source.name(),
            center,
            radius
        );

        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_candidates(center, radius).await;
            // The coordinator may have stopped; the result is then dropped
            let _ = completions.send(FetchOutcome {
                center,
                radius,
                result,
            });
        });
    }

    fn apply_fetch(&mut self, outcome: FetchOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome.result {
            Ok(places) => {
                info!(
                    "Received {} places around {} within {}",
                    places.len(),
                    outcome.center,
                    outcome.radius
                );
                self.state.candidates = places;
                self.relayout();
            }
            Err(error) => {
                // Keep the previous candidates
                self.raise_alert(error.into());
            }
        }
    }

    fn relayout(&mut self) {
        let Some((location, heading)) = self.state.pose() else {
            trace!("Skipping layout until location and heading are known");
            return;
        };

        let placements = self
            .engine
            .place(&self.state.candidates, location, heading);
        debug!(
            "Publishing {} of {} places at heading {}",
            placements.len(),
            self.state.candidates.len(),
            heading
        );
        self.state.placements = placements.clone();
        self.placements_tx.send_replace(placements);
    }

    fn raise_alert(&mut self, error: OverlayError) {
        warn!("{}", error);
        if self.alerts_tx.send(Alert::new(&error)).is_err() {
            debug!("Alert receiver dropped");
        }
    }

    /// Drive the coordinator until the sensor stream ends.
    ///
    /// Returns the final state. Fetches still in flight are not cancelled;
    /// their results are discarded.
    pub async fn run<S>(mut self, mut sensors: S) -> OverlayState
    where
        S: Stream<Item = SensorEvent> + Unpin,
    {
        info!("Update coordinator started (source: {})", self.source.name());
        let mut radius_open = true;

        loop {
            let deadline = self.debouncer.deadline();
            let wake_at = deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                event = sensors.next() => match event {
                    Some(event) => self.dispatch(event, Instant::now()),
                    None => {
                        info!("Sensor streams ended, stopping coordinator");
                        break;
                    }
                },
                Some(outcome) = self.completions_rx.recv() => self.apply_fetch(outcome),
                changed = self.radius.changed(), if radius_open => match changed {
                    Ok(()) => self.on_radius_changed(Instant::now()),
                    Err(_) => radius_open = false,
                },
                _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                    self.fire_due(Instant::now());
                }
            }
        }

        if self.in_flight > 0 {
            debug!("{} place fetches still in flight at shutdown", self.in_flight);
        }
        self.state
    }
}

fn debouncer_for(updates: &UpdatesConfig) -> Debouncer<GeoPoint> {
    Debouncer::new(Duration::from_millis(updates.debounce_ms))
        .with_max_wait(updates.max_wait_ms.map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LocationFix;
    use crate::place::{PlaceError, StaticPlaceSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call and answers from the builtin catalog
    #[derive(Default)]
    struct RecordingSource {
        calls: AtomicUsize,
        last_args: Mutex<Option<(GeoPoint, SearchRadius)>>,
        fail: bool,
    }

    impl RecordingSource {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_args(&self) -> Option<(GeoPoint, SearchRadius)> {
            *self.last_args.lock().unwrap()
        }
    }

    #[async_trait]
    impl PlaceSource for RecordingSource {
        async fn fetch_candidates(
            &self,
            center: GeoPoint,
            radius: SearchRadius,
        ) -> PlaceResult<Vec<Place>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = Some((center, radius));
            if self.fail {
                return Err(PlaceError::Network("connection reset".to_string()));
            }
            Ok(StaticPlaceSource::builtin().nearby(center, radius))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    const MALTEPE: GeoPoint = GeoPoint::new(40.9199, 29.1275);

    fn fix(latitude: f64, longitude: f64) -> SensorEvent {
        SensorEvent::Location(LocationFix::now(GeoPoint::new(latitude, longitude)))
    }

    fn coordinator(source: Arc<RecordingSource>) -> (UpdateCoordinator, OverlayHandle) {
        UpdateCoordinator::new(source, PlacementEngine::default(), &RadiusControl::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_invokes_source_once_with_last_args() {
        let source = Arc::new(RecordingSource::default());
        let (coordinator, _handle) = coordinator(source.clone());
        let (tx, sensors) = crate::input::Subscription::channel(32);
        let task = tokio::spawn(coordinator.run(sensors));

        for i in 0..10 {
            tx.send(fix(40.9199 + i as f64 * 0.0001, 29.1275)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(source.calls(), 1);
        let (center, radius) = source.last_args().unwrap();
        assert_eq!(center, GeoPoint::new(40.9199 + 9.0 * 0.0001, 29.1275));
        assert_eq!(radius, SearchRadius::default());

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heading_before_location_does_not_fetch() {
        let source = Arc::new(RecordingSource::default());
        let (mut coordinator, _handle) = coordinator(source.clone());

        coordinator.dispatch(SensorEvent::Heading(Heading::new(90.0)), Instant::now());
        assert!(coordinator.refresh_deadline().is_none());
        assert!(coordinator.state().placements.is_empty());

        tokio::time::advance(Duration::from_millis(2000)).await;
        coordinator.fire_due(Instant::now());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_placements_published_after_fetch() {
        let source = Arc::new(RecordingSource::default());
        let (coordinator, mut handle) = coordinator(source.clone());
        let (tx, sensors) = crate::input::Subscription::channel(8);
        let task = tokio::spawn(coordinator.run(sensors));

        tx.send(fix(MALTEPE.latitude, MALTEPE.longitude)).await.unwrap();
        // Maltepe Sahil lies a few meters east of this point
        tx.send(SensorEvent::Heading(Heading::new(90.0))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert!(handle.placements.has_changed().unwrap());
        let placements = handle.current();
        assert!(!placements.is_empty());
        assert!(placements.iter().any(|m| m.place.name == "Maltepe Sahil"));
        assert!(placements
            .windows(2)
            .all(|w| w[0].place.distance_km <= w[1].place.distance_km));

        drop(tx);
        let state = task.await.unwrap();
        assert_eq!(state.placements, placements);
        assert!(handle.alerts.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_alerts_and_keeps_candidates() {
        let source = Arc::new(RecordingSource::failing());
        let (mut coordinator, mut handle) = coordinator(source);

        let kept = StaticPlaceSource::builtin().nearby(MALTEPE, SearchRadius::default());
        coordinator.apply_fetch(FetchOutcome {
            center: MALTEPE,
            radius: SearchRadius::default(),
            result: Ok(kept.clone()),
        });

        coordinator.dispatch(fix(MALTEPE.latitude, MALTEPE.longitude), Instant::now());
        tokio::time::advance(Duration::from_millis(1000)).await;
        coordinator.fire_due(Instant::now());
        assert_eq!(coordinator.in_flight(), 1);

        let outcome = coordinator.completions_rx.recv().await.unwrap();
        coordinator.apply_fetch(outcome);

        assert_eq!(coordinator.state().candidates, kept);
        let alert = handle.next_alert().await.unwrap();
        assert_eq!(alert.title, "Could not load nearby places");
        assert!(handle.alerts.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heading_relayouts_cached_candidates_without_fetching() {
        let source = Arc::new(RecordingSource::default());
        let (mut coordinator, mut handle) = coordinator(source.clone());

        let cached = StaticPlaceSource::builtin().nearby(MALTEPE, SearchRadius::default());
        coordinator.apply_fetch(FetchOutcome {
            center: MALTEPE,
            radius: SearchRadius::default(),
            result: Ok(cached),
        });

        // location alone is not enough to lay anything out
        coordinator.dispatch(fix(MALTEPE.latitude, MALTEPE.longitude), Instant::now());
        assert!(!coordinator.state().is_ready());
        assert!(!handle.placements.has_changed().unwrap());
        assert!(coordinator.state().placements.is_empty());

        coordinator.dispatch(SensorEvent::Heading(Heading::new(90.0)), Instant::now());
        assert!(coordinator.state().is_ready());
        assert!(handle.placements.has_changed().unwrap());
        let east = handle.placements.borrow_and_update().clone();
        assert!(east.iter().any(|m| m.place.name == "Maltepe Sahil"));

        coordinator.dispatch(SensorEvent::Heading(Heading::new(270.0)), Instant::now());
        assert!(handle.placements.has_changed().unwrap());
        let west = handle.placements.borrow_and_update().clone();
        assert!(west.iter().any(|m| m.place.name == "HD İskender Maltepe"));
        assert!(west.iter().all(|m| m.place.name != "Maltepe Sahil"));
        assert_ne!(east, west);
        assert_eq!(coordinator.state().placements, west);

        assert_eq!(source.calls(), 0);
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_failure_raises_single_alert() {
        let source = Arc::new(RecordingSource::default());
        let (mut coordinator, mut handle) = coordinator(source);

        coordinator.dispatch(
            SensorEvent::LocationFailed(OverlayError::LocationUnavailable("timeout".into())),
            Instant::now(),
        );
        let alert = handle.alerts.try_recv().unwrap();
        assert_eq!(alert.title, "Location error");
        assert!(handle.alerts.try_recv().is_err());
        assert!(coordinator.state().location.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_radius_is_read_at_call_time() {
        let source = Arc::new(RecordingSource::default());
        let radius = RadiusControl::default();
        let (coordinator, _handle) =
            UpdateCoordinator::new(source.clone(), PlacementEngine::default(), &radius);
        let (tx, sensors) = crate::input::Subscription::channel(8);
        let task = tokio::spawn(coordinator.run(sensors));

        tx.send(fix(MALTEPE.latitude, MALTEPE.longitude)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        radius.step_up();
        tokio::time::sleep(Duration::from_millis(1600)).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(source.last_args().unwrap().1.km(), 1.5);

        drop(tx);
        let state = task.await.unwrap();
        assert_eq!(state.search_radius.km(), 1.5);
    }
}
