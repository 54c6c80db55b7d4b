//! Derived records: per-source metrics, cross-source rollups, comment
//! analysis, and the run report handed to persistence.
//!
//! Metric values are stored unrounded; rounding is a presentation concern.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ContentItem, Platform};

/// Discrete engagement tier. Variant order is tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    /// No items to classify.
    None,
    Low,
    Medium,
    High,
    Excellent,
}

impl std::fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PerformanceLevel::None => "none",
            PerformanceLevel::Low => "low",
            PerformanceLevel::Medium => "medium",
            PerformanceLevel::High => "high",
            PerformanceLevel::Excellent => "excellent",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItem {
    pub id: String,
    pub url: String,
    /// First 100 characters of the caption.
    pub caption: String,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeCount {
    pub content_type: String,
    pub count: usize,
}

/// Metrics for one source, derived from its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetrics {
    pub total_posts: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub total_views: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_shares: f64,
    pub avg_views: f64,
    pub avg_engagement_rate: f64,
    pub performance: PerformanceLevel,
    pub top_hashtags: Vec<HashtagCount>,
    pub top_items: Vec<TopItem>,
    /// Content-type histogram in first-seen order.
    pub content_types: Vec<ContentTypeCount>,
}

impl SourceMetrics {
    /// Metrics over zero items: all totals zero, performance `none`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_posts: 0,
            total_likes: 0,
            total_comments: 0,
            total_shares: 0,
            total_views: 0,
            avg_likes: 0.0,
            avg_comments: 0.0,
            avg_shares: 0.0,
            avg_views: 0.0,
            avg_engagement_rate: 0.0,
            performance: PerformanceLevel::None,
            top_hashtags: Vec::new(),
            top_items: Vec::new(),
            content_types: Vec::new(),
        }
    }
}

impl Default for SourceMetrics {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommenterCount {
    pub author: String,
    pub comments: usize,
}

/// Metrics over the comments actually retrieved for a source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentMetrics {
    pub total_comments: usize,
    /// Mean comment length in characters.
    pub avg_comment_length: f64,
    pub total_comment_likes: u64,
    pub top_commenters: Vec<CommenterCount>,
}

/// One platform's retrieval outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub platform: Platform,
    pub profile_ref: String,
    pub items: Vec<ContentItem>,
    pub metrics: SourceMetrics,
    pub comment_metrics: CommentMetrics,
}

impl SourceResult {
    /// A freshly retrieved result; metrics are attached later.
    #[must_use]
    pub fn new(platform: Platform, profile_ref: impl Into<String>, items: Vec<ContentItem>) -> Self {
        Self {
            platform,
            profile_ref: profile_ref.into(),
            items,
            metrics: SourceMetrics::empty(),
            comment_metrics: CommentMetrics::default(),
        }
    }

    /// Number of comments retrieved across all items.
    #[must_use]
    pub fn retrieved_comment_count(&self) -> usize {
        self.items.iter().map(|item| item.comments.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRank {
    pub platform: Platform,
    pub avg_engagement_rate: f64,
    pub posts: usize,
}

/// Cross-source rollup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    pub total_posts: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub total_views: u64,
    pub sources_analyzed: usize,
    pub top_hashtags_global: Vec<HashtagCount>,
    /// Sources by average engagement rate, descending; ties keep
    /// registration order.
    pub ranking: Vec<SourceRank>,
    pub best_performing: Option<Platform>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequency {
    pub term: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub recurring_themes: Vec<String>,
}

/// Output of the comment analyzer for one source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentAnalysis {
    pub sentiment: SentimentBreakdown,
    pub top_terms: Vec<TermFrequency>,
    pub insights: Insights,
    pub total_analyzed: usize,
}

impl CommentAnalysis {
    /// Substituted when analysis is skipped or fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No adapter registered for the platform.
    AdapterUnavailable,
    /// Discovery found no profile reference.
    TargetUnresolved,
    /// Retries were exhausted while retrieving.
    RetrievalFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::AdapterUnavailable => "no adapter registered",
            SkipReason::TargetUnresolved => "no profile reference resolved",
            SkipReason::RetrievalFailed => "retrieval failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSource {
    pub platform: Platform,
    pub reason: SkipReason,
    pub detail: Option<String>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub brand: String,
    /// The profile reference used per source.
    pub profile_refs: BTreeMap<Platform, String>,
    /// Successful sources in registration order.
    pub sources: Vec<SourceResult>,
    pub aggregate: AggregateReport,
    /// `None` when comment analysis was disabled for the run.
    pub analysis: Option<BTreeMap<Platform, CommentAnalysis>>,
    pub skipped: Vec<SkippedSource>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Platforms that actually produced data.
    #[must_use]
    pub fn produced_sources(&self) -> Vec<Platform> {
        self.sources.iter().map(|s| s.platform).collect()
    }
}
