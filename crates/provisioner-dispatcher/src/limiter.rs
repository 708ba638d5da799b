//! Per-worker issuance throttle.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Enforces a minimum interval between two acquisitions by the same worker.
///
/// Each worker owns its own limiter, so there is no contention and the
/// aggregate issuance rate is roughly `worker_count / interval`. The first
/// acquisition never waits. A zero interval disables throttling.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the interval since the previous acquisition has elapsed.
    pub async fn acquire(&mut self) {
        if let Some(deadline) = self.deadline() {
            sleep_until(deadline).await;
        }
        self.last = Some(Instant::now());
    }

    /// Like [`acquire`](Self::acquire), but gives up when `cancel` fires.
    ///
    /// Returns `false` if cancelled; the acquisition is not recorded then.
    pub async fn acquire_or_cancel(&mut self, cancel: &CancellationToken) -> bool {
        if let Some(deadline) = self.deadline() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = sleep_until(deadline) => {}
            }
        } else if cancel.is_cancelled() {
            return false;
        }
        self.last = Some(Instant::now());
        true
    }

    fn deadline(&self) -> Option<Instant> {
        if self.interval.is_zero() {
            return None;
        }
        self.last.map(|last| last + self.interval)
    }
}
