//! Fixed inter-submission delay

use std::time::Duration;

/// Throttles outbound requests with a static delay between submissions.
///
/// No queueing and no backoff: every call to [`wait`](Self::wait) sleeps for
/// the same configured duration. A zero delay disables pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingController {
    delay: Duration,
}

impl PacingController {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspend the caller for the configured delay.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for PacingController {
    fn default() -> Self {
        Self::from_millis(crate::config::defaults::DEFAULT_PACING_MS)
    }
}
