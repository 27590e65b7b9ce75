//! Minimum-interval throttle for external calls
//!
//! The geocoding provider's rate limit is respected by enforcing a fixed
//! minimum delay between successive calls. The policy is an explicit object
//! injected into the geocoding pass, so tests can substitute a zero
//! interval and run without real delays.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Enforces a minimum delay between successive `wait` calls
pub struct MinInterval {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl MinInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// A policy that never delays, for tests
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until at least `interval` has passed since the previous call;
    /// the first call returns immediately
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unthrottled_returns_immediately() {
        let throttle = MinInterval::unthrottled();
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_successive_calls_are_spaced() {
        let throttle = MinInterval::from_millis(20);
        throttle.wait().await;

        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
