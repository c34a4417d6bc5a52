//! Trailing-edge debounce for filter input.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Quiet period before search/location input becomes a hook dependency.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

/// Lets only the last value of a burst through.
///
/// Every call to [`settle`](Self::settle) waits out the delay; it yields its
/// value only if no newer call started in the meantime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(FILTER_DEBOUNCE)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, generation: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the quiet period. `None` means a later call superseded this one.
    pub async fn settle<T>(&self, value: T) -> Option<T> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tokio::time::sleep(self.delay).await;
        (self.generation.load(Ordering::Acquire) == generation).then_some(value)
    }
}
