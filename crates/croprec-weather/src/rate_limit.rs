//! Courtesy throttle for outbound provider calls.
//!
//! One limiter is shared by every request in the process: calls are spaced
//! at least `min_interval` apart regardless of coordinates. The limiter only
//! delays when a call may *begin*; it does not cap concurrent in-flight calls.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::clock::Clock;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    last_call_at: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            clock,
            last_call_at: Mutex::new(None),
        }
    }

    /// Wait until `min_interval` has passed since the previous `acquire`
    /// returned, then record the new call time.
    ///
    /// The lock is held across the wait so concurrent callers queue up and
    /// each gets its own slot.
    pub async fn acquire(&self) {
        let mut last = self.last_call_at.lock().await;

        if let Some(prev) = *last {
            let elapsed = self.clock.now().saturating_duration_since(prev);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!("Rate limiter waiting {:?} before provider call", wait);
                self.clock.sleep(wait).await;
            }
        }

        *last = Some(self.clock.now());
    }
}
