//! Comment analysis for brandlens.
//!
//! Scores comments with a lexicon, extracts frequent terms, and derives
//! structured insights (strengths, weaknesses, suggestions, recurring
//! themes). Runs entirely offline; the [`CommentAnalyzer`] trait is the seam
//! for other backends.

pub mod analyzer;
pub mod error;
pub mod insights;
pub mod scorer;
pub mod terms;

pub use analyzer::{CommentAnalyzer, CommentContext, LexiconAnalyzer};
pub use error::SentimentError;
pub use scorer::{lexicon_score, polarity, Polarity};
pub use terms::top_terms;
