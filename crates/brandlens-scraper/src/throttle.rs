//! Per-platform pacing between provider calls.

use std::sync::Arc;
use std::time::Duration;

use brandlens_core::{Platform, RateLimits};

use crate::retry::Sleeper;

/// Waits a fixed, platform-specific delay after each completed provider call.
#[derive(Clone)]
pub struct RateLimiter {
    limits: RateLimits,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limits: RateLimits, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { limits, sleeper }
    }

    #[must_use]
    pub fn delay_for(&self, platform: Platform) -> Duration {
        self.limits.for_platform(platform)
    }

    /// Sleep for the platform's delay. Zero returns immediately.
    pub async fn throttle(&self, platform: Platform) {
        self.pause(self.delay_for(platform)).await;
    }

    /// Sleep for the discovery-search delay.
    pub async fn throttle_search(&self) {
        self.pause(self.limits.search).await;
    }

    async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::debug!(delay_secs = delay.as_secs_f64(), "rate limit pause");
        self.sleeper.sleep(delay).await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
