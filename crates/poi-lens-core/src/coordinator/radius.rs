//! User-adjustable search radius shared with the coordinator

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::place::SearchRadius;

/// The radius control exposed to the user
///
/// Cloning shares the same underlying value; the coordinator reads it right
/// before each place source call.
#[derive(Debug, Clone)]
pub struct RadiusControl {
    tx: Arc<watch::Sender<SearchRadius>>,
}

impl RadiusControl {
    pub fn new(initial: SearchRadius) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> SearchRadius {
        *self.tx.borrow()
    }

    /// Set the radius (clamped into the allowed range)
    pub fn set(&self, radius: impl Into<SearchRadius>) -> SearchRadius {
        let radius = radius.into();
        self.tx.send_if_modified(|current| {
            if *current == radius {
                false
            } else {
                *current = radius;
                true
            }
        });
        debug!("Search radius set to {}", radius);
        radius
    }

    pub fn step_up(&self) -> SearchRadius {
        self.set(self.get().step_up())
    }

    pub fn step_down(&self) -> SearchRadius {
        self.set(self.get().step_down())
    }

    /// Watch for changes
    pub fn subscribe(&self) -> watch::Receiver<SearchRadius> {
        self.tx.subscribe()
    }
}

impl Default for RadiusControl {
    fn default() -> Self {
        Self::new(SearchRadius::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_stay_in_range() {
        let control = RadiusControl::new(SearchRadius::new(4.0));
        assert_eq!(control.step_up().km(), 4.5);
        assert_eq!(control.step_up().km(), 5.0);
        assert_eq!(control.step_up().km(), 5.0);

        control.set(0.5);
        assert_eq!(control.step_down().km(), 0.1);
        assert_eq!(control.step_down().km(), 0.1);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let control = RadiusControl::default();
        let mut rx = control.subscribe();
        let shared = control.clone();

        shared.set(2.0);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().km(), 2.0);

        // unchanged value does not notify
        control.set(2.0);
        assert!(!rx.has_changed().unwrap());
    }
}
