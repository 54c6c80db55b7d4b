use std::path::PathBuf;
use std::time::Duration;

use crate::app_config::AppConfig;
use crate::policy::{MetricsSettings, PerformanceThresholds, RateLimits, RetryPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// config; the Apify token is only checked where a provider client is built.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let apify_token = lookup("APIFY_TOKEN").ok().filter(|t| !t.trim().is_empty());
    let log_level = or_default("BRANDLENS_LOG_LEVEL", "info");
    let storage_dir = PathBuf::from(or_default("BRANDLENS_STORAGE_DIR", "./storage/results"));

    let max_items = parse_usize("BRANDLENS_MAX_ITEMS", "10")?;
    let max_comments = parse_usize("BRANDLENS_MAX_COMMENTS", "50")?;

    let retry_max_attempts = parse_u32("BRANDLENS_RETRY_MAX_ATTEMPTS", "3")?;
    if retry_max_attempts == 0 {
        return Err(invalid(
            "BRANDLENS_RETRY_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let retry_base_delay_secs = parse_u64("BRANDLENS_RETRY_BASE_DELAY_SECS", "2")?;
    let call_timeout_secs = parse_u64("BRANDLENS_CALL_TIMEOUT_SECS", "300")?;
    let retry = RetryPolicy::new(
        retry_max_attempts,
        Duration::from_secs(retry_base_delay_secs),
        Duration::from_secs(call_timeout_secs),
    );

    let request_timeout_secs = parse_u64("BRANDLENS_REQUEST_TIMEOUT_SECS", "330")?;
    let user_agent = or_default("BRANDLENS_USER_AGENT", "brandlens/0.1 (social-analytics)");

    let rate_limits = RateLimits {
        instagram: Duration::from_secs(parse_u64("BRANDLENS_RATE_LIMIT_INSTAGRAM_SECS", "2")?),
        tiktok: Duration::from_secs(parse_u64("BRANDLENS_RATE_LIMIT_TIKTOK_SECS", "3")?),
        youtube: Duration::from_secs(parse_u64("BRANDLENS_RATE_LIMIT_YOUTUBE_SECS", "2")?),
        search: Duration::from_secs(parse_u64("BRANDLENS_RATE_LIMIT_SEARCH_SECS", "1")?),
    };

    let thresholds = PerformanceThresholds::new(
        parse_f64("BRANDLENS_THRESHOLD_LOW", "1.0")?,
        parse_f64("BRANDLENS_THRESHOLD_MEDIUM", "3.0")?,
        parse_f64("BRANDLENS_THRESHOLD_HIGH", "5.0")?,
    )?;
    let metrics = MetricsSettings {
        thresholds,
        top_hashtags: parse_usize("BRANDLENS_TOP_HASHTAGS", "10")?,
        top_items: parse_usize("BRANDLENS_TOP_ITEMS", "5")?,
        top_global_hashtags: parse_usize("BRANDLENS_TOP_GLOBAL_HASHTAGS", "15")?,
        top_commenters: parse_usize("BRANDLENS_TOP_COMMENTERS", "10")?,
    };

    let max_concurrent_sources = parse_usize("BRANDLENS_MAX_CONCURRENT_SOURCES", "1")?.max(1);
    let ai_enabled = parse_bool("BRANDLENS_AI_ENABLED", "false")?;

    Ok(AppConfig {
        apify_token,
        log_level,
        storage_dir,
        max_items,
        max_comments,
        retry,
        request_timeout_secs,
        user_agent,
        rate_limits,
        metrics,
        max_concurrent_sources,
        ai_enabled,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
