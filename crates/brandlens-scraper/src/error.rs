use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider rejected credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("{description} timed out after {timeout_secs}s")]
    Timeout {
        description: String,
        timeout_secs: u64,
    },

    #[error("provider run did not succeed: {0}")]
    RunFailed(String),

    #[error("parse error for {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("APIFY_TOKEN is not set")]
    MissingToken,

    #[error("{description} failed after {attempts} attempts: {source}")]
    ExhaustedRetries {
        description: String,
        attempts: u32,
        #[source]
        source: Box<ScraperError>,
    },
}

impl ScraperError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Credential rejections, missing configuration, malformed payloads, and
    /// already-exhausted retries are final.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::Api { .. }
                | ScraperError::Timeout { .. }
                | ScraperError::RunFailed(_)
        )
    }
}
