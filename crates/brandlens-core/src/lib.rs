//! Shared data model and configuration for brandlens.
//!
//! Every other crate in the workspace speaks in these types: retrieved
//! [`ContentItem`]s and [`Comment`]s, the per-source and cross-source metric
//! records, and the run report handed to persistence.

pub mod app_config;
pub mod config;
pub mod content;
pub mod policy;
pub mod report;
pub mod targets;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use content::{Comment, CommentDetails, CommentPreview, ContentItem, ItemDetails, Platform};
pub use policy::{MetricsSettings, PerformanceThresholds, RateLimits, RetryPolicy};
pub use report::{
    AggregateReport, CommentAnalysis, CommentMetrics, CommenterCount, ContentTypeCount,
    HashtagCount, Insights, PerformanceLevel, RunReport, SentimentBreakdown, SkipReason,
    SkippedSource, SourceMetrics, SourceRank, SourceResult, TermFrequency, TopItem,
};
pub use targets::{load_targets, TargetsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[from] serde_yaml::Error),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("validation error: {0}")]
    Validation(String),
}
