//! Minimal Apify REST client.
//!
//! Every provider call in this crate runs an actor synchronously through
//! `POST /acts/{actor}/run-sync-get-dataset-items`, which blocks until the
//! run finishes and returns the dataset items as a JSON array. Items are
//! returned as raw [`serde_json::Value`]s so each adapter can parse them
//! individually and drop the malformed ones.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::ScraperError;

pub const BASE_URL: &str = "https://api.apify.com/v2";

pub const INSTAGRAM_ACTOR: &str = "apify~instagram-scraper";
pub const TIKTOK_ACTOR: &str = "clockworks~tiktok-scraper";
pub const TIKTOK_COMMENTS_ACTOR: &str = "clockworks~tiktok-comments-scraper";
pub const YOUTUBE_ACTOR: &str = "streamers~youtube-scraper";
pub const YOUTUBE_COMMENTS_ACTOR: &str = "streamers~youtube-comments-scraper";
pub const GOOGLE_SEARCH_ACTOR: &str = "apify~google-search-scraper";

#[derive(Clone)]
pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: String,
    run_timeout_secs: u64,
}

impl ApifyClient {
    /// Builds a client with a request timeout and `User-Agent`.
    ///
    /// `run_timeout_secs` is passed to Apify as the actor run timeout; keep
    /// the HTTP `timeout_secs` above it so the provider gives up first.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingToken`] for an empty token, or
    /// [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        token: impl Into<String>,
        timeout_secs: u64,
        run_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ScraperError::MissingToken);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            token,
            base_url: BASE_URL.to_string(),
            run_timeout_secs,
        })
    }

    /// Points the client at a different API root (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs `actor` with `input` and returns its dataset items.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Unauthorized`]: HTTP 401 or 403.
    /// - [`ScraperError::RunFailed`]: HTTP 408, the run did not finish in time.
    /// - [`ScraperError::Api`]: any other non-2xx status.
    /// - [`ScraperError::Parse`]: the body is not a JSON array.
    /// - [`ScraperError::Http`]: network or TLS failure.
    pub async fn run_actor<I>(&self, actor: &str, input: &I) -> Result<Vec<Value>, ScraperError>
    where
        I: Serialize + ?Sized,
    {
        let url = format!("{}/acts/{actor}/run-sync-get-dataset-items", self.base_url);
        tracing::debug!(actor, "running Apify actor");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("timeout", self.run_timeout_secs.to_string()),
                ("format", "json".to_string()),
            ])
            .json(input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScraperError::Unauthorized {
                    status: status.as_u16(),
                    message,
                },
                StatusCode::REQUEST_TIMEOUT => {
                    ScraperError::RunFailed(format!("{actor} timed out: {message}"))
                }
                _ => ScraperError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await?;
        let items: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| ScraperError::Parse {
                context: format!("dataset items from {actor}"),
                reason: e.to_string(),
            })?;

        tracing::debug!(actor, count = items.len(), "Apify actor finished");
        Ok(items)
    }
}

impl std::fmt::Debug for ApifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApifyClient")
            .field("base_url", &self.base_url)
            .field("token", &"[redacted]")
            .field("run_timeout_secs", &self.run_timeout_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_token() {
        let result = ApifyClient::new("   ", 5, 5, "brandlens-test/0.1");
        assert!(matches!(result, Err(ScraperError::MissingToken)));
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let client = ApifyClient::new("tok", 5, 5, "brandlens-test/0.1")
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn debug_output_redacts_token() {
        let client = ApifyClient::new("apify_api_secret", 5, 5, "brandlens-test/0.1").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("apify_api_secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
