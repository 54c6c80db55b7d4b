use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("analysis backend error: {0}")]
    Backend(String),

    #[error("invalid analyzer input: {0}")]
    InvalidInput(String),
}
