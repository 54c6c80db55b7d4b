//! Metrics aggregation for retrieved content.
//!
//! Pure functions, no I/O. Reduces per-item counters into per-source
//! [`SourceMetrics`](brandlens_core::SourceMetrics) and a cross-source
//! [`AggregateReport`](brandlens_core::AggregateReport). Every ordering
//! produced here is reproducible from input order alone: ties always keep
//! first-seen order.

pub mod aggregate;
pub mod engagement;
pub mod rank;
pub mod source;

pub use aggregate::aggregate;
pub use engagement::{classify, engagement_rate, item_engagement_rate, EngagementExt};
pub use rank::top_by_frequency;
pub use source::{attach_metrics, comment_metrics, source_metrics};
