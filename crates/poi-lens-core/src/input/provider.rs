//! Provider traits and cancellable subscriptions

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use poi_lens_config::LocationConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::event::{LocationUpdate, SensorEvent};
use crate::spatial::Heading;

/// Options handed to a location provider on subscribe
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    /// Give up on a single fix after this long
    pub timeout: Duration,
    /// Accept cached fixes at most this old
    pub max_age_ms: u64,
    /// Suppress fixes closer than this to the previous one
    pub min_distance_m: f64,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self::from(&LocationConfig::default())
    }
}

impl From<&LocationConfig> for LocationOptions {
    fn from(config: &LocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_millis(config.timeout_ms),
            max_age_ms: config.max_age_ms,
            min_distance_m: config.min_distance_m,
        }
    }
}

/// A live subscription to a sensor stream
///
/// Dropping it, or calling [`Subscription::unsubscribe`], stops the producer.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    producer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Subscription<T> {
    /// Drive `stream` on a background task and deliver its items
    pub fn spawn<S>(stream: S, buffer: usize) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let producer = tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(item) = stream.next().await {
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            producer: Some(producer),
        }
    }
}

impl<T> Subscription<T> {
    /// A subscription fed by the returned sender (push-style providers)
    pub fn channel(buffer: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx, producer: None })
    }

    /// Receive the next item, `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop the producer; items already buffered are discarded
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
        self.rx.close();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

/// Source of GPS fixes
pub trait LocationProvider: Send + Sync {
    /// Start watching the position
    fn subscribe(&self, options: LocationOptions) -> Subscription<LocationUpdate>;
}

/// Source of compass headings
pub trait HeadingProvider: Send + Sync {
    /// Start sampling; a heading is delivered each time it changes by at
    /// least `update_rate_deg`
    fn start(&self, update_rate_deg: f64) -> Subscription<Heading>;
}

/// Merge both sensor subscriptions into one event stream.
///
/// The merged stream ends once both subscriptions have ended.
pub fn sensor_events(
    location: Subscription<LocationUpdate>,
    heading: Subscription<Heading>,
) -> impl Stream<Item = SensorEvent> + Unpin + Send {
    futures::stream::select(
        location.map(SensorEvent::from_location_update),
        heading.map(SensorEvent::Heading),
    )
}
