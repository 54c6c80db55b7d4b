//! Per-source metrics.

use brandlens_core::{
    Comment, CommentMetrics, CommenterCount, ContentItem, ContentTypeCount, HashtagCount,
    MetricsSettings, SourceMetrics, SourceResult, TopItem,
};

use crate::engagement::{classify, item_engagement_rate};
use crate::rank::top_by_frequency;

const CAPTION_PREVIEW_CHARS: usize = 100;

/// Compute metrics for one source's items.
///
/// An empty slice yields [`SourceMetrics::empty`], which classifies as
/// `PerformanceLevel::None`. Top items are ranked by engagement rate; items
/// with equal rates keep their retrieval order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn source_metrics(items: &[ContentItem], settings: &MetricsSettings) -> SourceMetrics {
    if items.is_empty() {
        return SourceMetrics::empty();
    }

    let total_posts = items.len();
    let mut total_likes: u64 = 0;
    let mut total_comments: u64 = 0;
    let mut total_shares: u64 = 0;
    let mut total_views: u64 = 0;
    let mut rate_sum = 0.0;
    let mut rated: Vec<(&ContentItem, f64)> = Vec::with_capacity(total_posts);

    for item in items {
        total_likes = total_likes.saturating_add(item.likes);
        total_comments = total_comments.saturating_add(item.comment_count);
        total_shares = total_shares.saturating_add(item.shares);
        total_views = total_views.saturating_add(item.views);

        let rate = item_engagement_rate(item);
        rate_sum += rate;
        rated.push((item, rate));
    }

    let n = total_posts as f64;
    let avg_engagement_rate = rate_sum / n;

    let hashtags = items.iter().flat_map(|i| i.hashtags.iter());
    let top_hashtags = top_by_frequency(hashtags, settings.top_hashtags)
        .into_iter()
        .map(|(tag, count)| HashtagCount { tag, count })
        .collect();

    let content_types = top_by_frequency(items.iter().map(|i| i.content_type.as_str()), usize::MAX)
        .into_iter()
        .map(|(content_type, count)| ContentTypeCount {
            content_type,
            count,
        })
        .collect();

    rated.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_items = rated
        .into_iter()
        .take(settings.top_items)
        .map(|(item, rate)| TopItem {
            id: item.id.clone(),
            url: item.url.clone(),
            caption: item.caption.chars().take(CAPTION_PREVIEW_CHARS).collect(),
            likes: item.likes,
            comments: item.comment_count,
            views: item.views,
            engagement_rate: rate,
        })
        .collect();

    SourceMetrics {
        total_posts,
        total_likes,
        total_comments,
        total_shares,
        total_views,
        avg_likes: total_likes as f64 / n,
        avg_comments: total_comments as f64 / n,
        avg_shares: total_shares as f64 / n,
        avg_views: total_views as f64 / n,
        avg_engagement_rate,
        performance: classify(avg_engagement_rate, &settings.thresholds),
        top_hashtags,
        top_items,
        content_types,
    }
}

/// Summarize retrieved comments: volume, average text length in characters,
/// likes, and the most active authors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn comment_metrics<'a, I>(comments: I, top_commenters: usize) -> CommentMetrics
where
    I: IntoIterator<Item = &'a Comment>,
{
    let comments: Vec<&Comment> = comments.into_iter().collect();
    if comments.is_empty() {
        return CommentMetrics::default();
    }

    let total_comments = comments.len();
    let total_chars: usize = comments.iter().map(|c| c.text.chars().count()).sum();
    let total_comment_likes = comments
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.likes));

    let top_commenters = top_by_frequency(
        comments
            .iter()
            .map(|c| c.author.as_str())
            .filter(|author| !author.is_empty()),
        top_commenters,
    )
    .into_iter()
    .map(|(author, comments)| CommenterCount { author, comments })
    .collect();

    CommentMetrics {
        total_comments,
        avg_comment_length: total_chars as f64 / total_comments as f64,
        total_comment_likes,
        top_commenters,
    }
}

/// Fill in `metrics` and `comment_metrics` on a retrieved source.
pub fn attach_metrics(result: &mut SourceResult, settings: &MetricsSettings) {
    result.metrics = source_metrics(&result.items, settings);
    result.comment_metrics = comment_metrics(
        result.items.iter().flat_map(|item| item.comments.iter()),
        settings.top_commenters,
    );
}

#[cfg(test)]
mod tests {
    use brandlens_core::{CommentDetails, ItemDetails, PerformanceLevel, Platform};

    use super::*;

    fn item(id: &str, likes: u64, comments: u64, shares: u64, views: u64) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
            caption: String::new(),
            published_at: None,
            likes,
            shares,
            views,
            comment_count: comments,
            hashtags: Vec::new(),
            content_type: "video".to_string(),
            thumbnail_url: None,
            owner: None,
            comments: Vec::new(),
            details: ItemDetails::default(),
        }
    }

    fn comment(author: &str, text: &str, likes: u64) -> Comment {
        Comment {
            id: format!("{author}-{text}"),
            author: author.to_string(),
            text: text.to_string(),
            likes,
            published_at: None,
            details: CommentDetails::default(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_items_yield_empty_metrics() {
        let metrics = source_metrics(&[], &MetricsSettings::default());
        assert_eq!(metrics, SourceMetrics::empty());
        assert_eq!(metrics.performance, PerformanceLevel::None);
    }

    #[test]
    fn single_item_scenario() {
        let items = vec![item("a", 100, 20, 5, 1000)];
        let metrics = source_metrics(&items, &MetricsSettings::default());

        assert_eq!(metrics.total_posts, 1);
        assert_eq!(metrics.total_likes, 100);
        assert_eq!(metrics.total_comments, 20);
        assert_eq!(metrics.total_shares, 5);
        assert_eq!(metrics.total_views, 1000);
        assert!(approx(metrics.avg_engagement_rate, 12.5));
        assert_eq!(metrics.performance, PerformanceLevel::Excellent);
        assert_eq!(metrics.top_items.len(), 1);
        assert!(approx(metrics.top_items[0].engagement_rate, 12.5));
    }

    #[test]
    fn averages_divide_by_item_count() {
        let items = vec![item("a", 10, 0, 0, 100), item("b", 30, 4, 2, 300)];
        let metrics = source_metrics(&items, &MetricsSettings::default());

        assert!(approx(metrics.avg_likes, 20.0));
        assert!(approx(metrics.avg_comments, 2.0));
        assert!(approx(metrics.avg_shares, 1.0));
        assert!(approx(metrics.avg_views, 200.0));
        // (10% + 12%) / 2
        assert!(approx(metrics.avg_engagement_rate, 11.0));
    }

    #[test]
    fn zero_view_items_use_one_as_denominator() {
        let items = vec![item("img", 12, 0, 0, 0)];
        let metrics = source_metrics(&items, &MetricsSettings::default());
        assert!(approx(metrics.avg_engagement_rate, 1200.0));
    }

    #[test]
    fn top_items_are_ranked_and_limited() {
        let items = vec![
            item("low", 1, 0, 0, 100),
            item("high", 50, 0, 0, 100),
            item("mid", 10, 0, 0, 100),
        ];
        let settings = MetricsSettings {
            top_items: 2,
            ..MetricsSettings::default()
        };
        let metrics = source_metrics(&items, &settings);
        let ids: Vec<&str> = metrics.top_items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
    }

    #[test]
    fn top_items_ties_keep_retrieval_order() {
        let items = vec![
            item("first", 5, 0, 0, 100),
            item("second", 5, 0, 0, 100),
            item("third", 5, 0, 0, 100),
        ];
        let metrics = source_metrics(&items, &MetricsSettings::default());
        let ids: Vec<&str> = metrics.top_items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn caption_preview_is_truncated_by_characters() {
        let mut long = item("a", 1, 0, 0, 1);
        long.caption = "é".repeat(150);
        let metrics = source_metrics(&[long], &MetricsSettings::default());
        assert_eq!(metrics.top_items[0].caption.chars().count(), 100);
    }

    #[test]
    fn hashtags_and_content_types_are_counted() {
        let mut a = item("a", 1, 0, 0, 1);
        a.hashtags = vec!["launch".to_string(), "brand".to_string()];
        a.content_type = "image".to_string();
        let mut b = item("b", 1, 0, 0, 1);
        b.hashtags = vec!["brand".to_string()];
        let metrics = source_metrics(&[a, b], &MetricsSettings::default());

        assert_eq!(
            metrics.top_hashtags,
            vec![
                HashtagCount {
                    tag: "brand".to_string(),
                    count: 2
                },
                HashtagCount {
                    tag: "launch".to_string(),
                    count: 1
                },
            ]
        );
        let types: Vec<(&str, usize)> = metrics
            .content_types
            .iter()
            .map(|c| (c.content_type.as_str(), c.count))
            .collect();
        assert_eq!(types, vec![("image", 1), ("video", 1)]);
    }

    #[test]
    fn comment_metrics_counts_authors_and_length() {
        let comments = vec![
            comment("ana", "love it", 3),
            comment("ben", "meh", 0),
            comment("ana", "again!", 1),
        ];
        let metrics = comment_metrics(&comments, 10);

        assert_eq!(metrics.total_comments, 3);
        assert_eq!(metrics.total_comment_likes, 4);
        // (7 + 3 + 6) / 3
        assert!(approx(metrics.avg_comment_length, 16.0 / 3.0));
        assert_eq!(metrics.top_commenters[0].author, "ana");
        assert_eq!(metrics.top_commenters[0].comments, 2);
        assert_eq!(metrics.top_commenters[1].author, "ben");
    }

    #[test]
    fn comment_metrics_for_no_comments_is_default() {
        let metrics = comment_metrics(std::iter::empty(), 10);
        assert_eq!(metrics, CommentMetrics::default());
    }

    #[test]
    fn attach_metrics_fills_both_sections() {
        let mut with_comments = item("a", 100, 20, 5, 1000);
        with_comments.comments = vec![comment("ana", "nice", 0)];
        let mut result = SourceResult::new(
            Platform::Instagram,
            "https://instagram.com/acme",
            vec![with_comments],
        );
        attach_metrics(&mut result, &MetricsSettings::default());

        assert_eq!(result.metrics.total_posts, 1);
        assert_eq!(result.comment_metrics.total_comments, 1);
    }
}
