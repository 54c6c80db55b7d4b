//! The comment analyzer contract and its lexicon-based implementation.

use async_trait::async_trait;
use brandlens_core::{CommentAnalysis, ContentItem, Platform, SentimentBreakdown};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::insights::derive_insights;
use crate::scorer::{polarity, Polarity};
use crate::terms::top_terms;

/// One comment plus the item it was left on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentContext {
    pub text: String,
    pub author: String,
    pub item_url: String,
}

impl CommentContext {
    /// Flatten every retrieved comment of `items`, in item then comment order.
    #[must_use]
    pub fn from_items(items: &[ContentItem]) -> Vec<Self> {
        items
            .iter()
            .flat_map(|item| {
                item.comments.iter().map(move |c| Self {
                    text: c.text.clone(),
                    author: c.author.clone(),
                    item_url: item.url.clone(),
                })
            })
            .collect()
    }
}

/// Turns a source's comments into sentiment, terms, and insights.
#[async_trait]
pub trait CommentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        comments: &[CommentContext],
        platform: Platform,
    ) -> Result<CommentAnalysis, SentimentError>;
}

/// Offline analyzer using the built-in lexicon.
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    sample_size: usize,
    max_terms: usize,
}

impl LexiconAnalyzer {
    pub const DEFAULT_SAMPLE_SIZE: usize = 200;
    pub const DEFAULT_MAX_TERMS: usize = 100;

    #[must_use]
    pub fn new() -> Self {
        Self {
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
            max_terms: Self::DEFAULT_MAX_TERMS,
        }
    }

    /// Only the first `sample_size` comments are scored for sentiment.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Synchronous core of [`CommentAnalyzer::analyze`].
    #[must_use]
    pub fn analyze_texts(&self, texts: &[&str]) -> CommentAnalysis {
        if texts.is_empty() {
            return CommentAnalysis::empty();
        }

        let sentiment = sentiment_breakdown(texts.iter().take(self.sample_size).copied());
        let top_terms = top_terms(texts, self.max_terms);
        let insights = derive_insights(texts, &sentiment, &top_terms);

        CommentAnalysis {
            sentiment,
            top_terms,
            insights,
            total_analyzed: texts.len(),
        }
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_precision_loss)]
fn sentiment_breakdown<'a>(texts: impl Iterator<Item = &'a str>) -> SentimentBreakdown {
    let mut breakdown = SentimentBreakdown::default();
    for text in texts {
        match polarity(text) {
            Polarity::Positive => breakdown.positive += 1,
            Polarity::Neutral => breakdown.neutral += 1,
            Polarity::Negative => breakdown.negative += 1,
        }
    }

    let total = breakdown.positive + breakdown.neutral + breakdown.negative;
    if total > 0 {
        let pct = |n: usize| round1(n as f64 / total as f64 * 100.0);
        breakdown.positive_pct = pct(breakdown.positive);
        breakdown.neutral_pct = pct(breakdown.neutral);
        breakdown.negative_pct = pct(breakdown.negative);
    }
    breakdown
}

#[async_trait]
impl CommentAnalyzer for LexiconAnalyzer {
    async fn analyze(
        &self,
        comments: &[CommentContext],
        platform: Platform,
    ) -> Result<CommentAnalysis, SentimentError> {
        let texts: Vec<&str> = comments
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect();

        let analysis = self.analyze_texts(&texts);
        tracing::info!(
            source = %platform,
            analyzed = analysis.total_analyzed,
            positive = analysis.sentiment.positive,
            neutral = analysis.sentiment.neutral,
            negative = analysis.sentiment.negative,
            "comment analysis complete"
        );
        Ok(analysis)
    }
}
