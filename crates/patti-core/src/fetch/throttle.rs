//! Pacing for bursty Drive calls.

use std::time::Duration;

/// Consulted by strategies that issue bursts of API calls.
pub trait Throttle {
    /// Called after a filename search found and fetched a file.
    fn after_search(&self);
}

/// Sleeps a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        FixedDelay(Duration::from_millis(ms))
    }
}

impl Throttle for FixedDelay {
    fn after_search(&self) {
        if !self.0.is_zero() {
            tracing::trace!(delay_ms = self.0.as_millis() as u64, "search throttle");
            std::thread::sleep(self.0);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn after_search(&self) {}
}
