use std::path::PathBuf;

use crate::policy::{MetricsSettings, RateLimits, RetryPolicy};

#[derive(Clone)]
pub struct AppConfig {
    pub apify_token: Option<String>,
    pub log_level: String,
    pub storage_dir: PathBuf,
    pub max_items: usize,
    pub max_comments: usize,
    pub retry: RetryPolicy,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub rate_limits: RateLimits,
    pub metrics: MetricsSettings,
    pub max_concurrent_sources: usize,
    pub ai_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "apify_token",
                &self.apify_token.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("storage_dir", &self.storage_dir)
            .field("max_items", &self.max_items)
            .field("max_comments", &self.max_comments)
            .field("retry", &self.retry)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("rate_limits", &self.rate_limits)
            .field("metrics", &self.metrics)
            .field("max_concurrent_sources", &self.max_concurrent_sources)
            .field("ai_enabled", &self.ai_enabled)
            .finish()
    }
}
