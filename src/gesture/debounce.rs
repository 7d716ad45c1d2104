// Debouncing - drops pulses that follow an accepted pulse too closely
//
// Contact bounce on a push button produces a burst of edges per press.
// Only the first edge of a burst is passed on.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Accepts a pulse only if `min_interval` has passed since the last accepted one
#[derive(Debug)]
pub struct Debouncer {
    min_interval: Duration,
    /// Time of the last accepted pulse
    last: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Check a pulse arriving now
    pub fn accept_now(&self) -> bool {
        self.accept(Instant::now())
    }

    /// Check a pulse arriving at `now`.
    ///
    /// Rejected pulses do not extend the quiet period.
    pub fn accept(&self, now: Instant) -> bool {
        let mut last = self.last.lock();
        if let Some(previous) = *last {
            if now.saturating_duration_since(previous) < self.min_interval {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}
