//! Cross-source rollup.

use brandlens_core::{AggregateReport, HashtagCount, MetricsSettings, SourceRank, SourceResult};

use crate::rank::top_by_frequency;

/// Combine per-source metrics into one report.
///
/// `sources` must already carry computed metrics (see
/// [`attach_metrics`](crate::attach_metrics)). Global hashtags count how many
/// sources list a tag among their own top hashtags, not raw occurrences. The
/// ranking is by average engagement rate, highest first; sources with equal
/// rates keep the order they were passed in.
#[must_use]
pub fn aggregate(sources: &[SourceResult], settings: &MetricsSettings) -> AggregateReport {
    let mut report = AggregateReport {
        sources_analyzed: sources.len(),
        ..AggregateReport::default()
    };

    for source in sources {
        let m = &source.metrics;
        report.total_posts += m.total_posts;
        report.total_likes = report.total_likes.saturating_add(m.total_likes);
        report.total_comments = report.total_comments.saturating_add(m.total_comments);
        report.total_shares = report.total_shares.saturating_add(m.total_shares);
        report.total_views = report.total_views.saturating_add(m.total_views);
    }

    let tags = sources
        .iter()
        .flat_map(|s| s.metrics.top_hashtags.iter().map(|h| h.tag.as_str()));
    report.top_hashtags_global = top_by_frequency(tags, settings.top_global_hashtags)
        .into_iter()
        .map(|(tag, count)| HashtagCount { tag, count })
        .collect();

    let mut ranking: Vec<SourceRank> = sources
        .iter()
        .map(|s| SourceRank {
            platform: s.platform,
            avg_engagement_rate: s.metrics.avg_engagement_rate,
            posts: s.metrics.total_posts,
        })
        .collect();
    ranking.sort_by(|a, b| b.avg_engagement_rate.total_cmp(&a.avg_engagement_rate));

    report.best_performing = ranking.first().map(|r| r.platform);
    report.ranking = ranking;
    report
}
