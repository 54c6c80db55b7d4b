//! Immutable policy values supplied by configuration: retry, rate limits,
//! and metric settings.

use std::time::Duration;

use crate::content::Platform;
use crate::ConfigError;

/// Bounded-attempt retry with linear backoff.
///
/// | Attempt that failed | Wait before next attempt |
/// |---------------------|--------------------------|
/// | 1                   | `base_delay × 1`         |
/// | 2                   | `base_delay × 2`         |
/// | `max_attempts`      | none, error is returned  |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    call_timeout: Duration,
}

impl RetryPolicy {
    /// Builds a policy. `max_attempts` below 1 is raised to 1 so the
    /// operation always runs at least once.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            call_timeout,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Upper bound for a single attempt of the wrapped operation.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Delay to wait after the 1-based `attempt` failed.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(300))
    }
}

/// Minimum pause after each provider call, per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub instagram: Duration,
    pub tiktok: Duration,
    pub youtube: Duration,
    /// Pause between profile-discovery searches.
    pub search: Duration,
}

impl RateLimits {
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Duration {
        match platform {
            Platform::Instagram => self.instagram,
            Platform::Tiktok => self.tiktok,
            Platform::Youtube => self.youtube,
        }
    }

    /// All delays zero. Used by tests and dry runs.
    #[must_use]
    pub fn none() -> Self {
        Self {
            instagram: Duration::ZERO,
            tiktok: Duration::ZERO,
            youtube: Duration::ZERO,
            search: Duration::ZERO,
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            instagram: Duration::from_secs(2),
            tiktok: Duration::from_secs(3),
            youtube: Duration::from_secs(2),
            search: Duration::from_secs(1),
        }
    }
}

/// Ascending engagement-rate boundaries (percent) between performance tiers.
///
/// A rate exactly on a boundary belongs to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceThresholds {
    low: f64,
    medium: f64,
    high: f64,
}

impl PerformanceThresholds {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] unless `0 <= low < medium < high`
    /// and all values are finite.
    pub fn new(low: f64, medium: f64, high: f64) -> Result<Self, ConfigError> {
        if ![low, medium, high].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Validation(
                "performance thresholds must be finite numbers".to_string(),
            ));
        }
        if low < 0.0 || !(low < medium && medium < high) {
            return Err(ConfigError::Validation(format!(
                "performance thresholds must be ascending and non-negative, got {low} / {medium} / {high}"
            )));
        }
        Ok(Self { low, medium, high })
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[must_use]
    pub fn medium(&self) -> f64 {
        self.medium
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 3.0,
            high: 5.0,
        }
    }
}

/// Sizes and boundaries used by the metrics aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSettings {
    pub thresholds: PerformanceThresholds,
    pub top_hashtags: usize,
    pub top_items: usize,
    pub top_global_hashtags: usize,
    pub top_commenters: usize,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            thresholds: PerformanceThresholds::default(),
            top_hashtags: 10,
            top_items: 5,
            top_global_hashtags: 15,
            top_commenters: 10,
        }
    }
}
