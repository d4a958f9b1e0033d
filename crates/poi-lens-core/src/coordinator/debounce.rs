//! Trailing-edge rate limiter

use std::time::Duration;

use tokio::time::Instant;

/// Coalesces triggers and releases only the most recent arguments once the
/// window has passed without a new trigger.
///
/// Every trigger cancels the scheduled dispatch and reschedules it `window`
/// later. With a `max_wait`, a steady stream of triggers still dispatches at
/// most `max_wait` after the first one. Two dispatches are never closer than
/// `window`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    max_wait: Option<Duration>,
    pending: Option<T>,
    first_pending_at: Option<Instant>,
    deadline: Option<Instant>,
    last_dispatch: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            max_wait: None,
            pending: None,
            first_pending_at: None,
            deadline: None,
            last_dispatch: None,
        }
    }

    /// Cap how long continuous triggers may postpone a dispatch
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait.map(|wait| wait.max(self.window));
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending arguments and reschedule
    pub fn trigger(&mut self, args: T, now: Instant) {
        let first = *self.first_pending_at.get_or_insert(now);
        self.pending = Some(args);

        let mut deadline = now + self.window;
        if let Some(max_wait) = self.max_wait {
            deadline = deadline.min(first + max_wait);
        }
        if let Some(last) = self.last_dispatch {
            deadline = deadline.max(last + self.window);
        }
        self.deadline = Some(deadline);
    }

    /// When the pending call becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending arguments if the deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.first_pending_at = None;
                self.last_dispatch = Some(now);
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Drop the pending call without dispatching it
    pub fn cancel(&mut self) -> Option<T> {
        self.deadline = None;
        self.first_pending_at = None;
        self.pending.take()
    }
}
