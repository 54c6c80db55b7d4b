//! Engagement rate and performance classification.

use brandlens_core::{ContentItem, PerformanceLevel, PerformanceThresholds};

/// Engagement rate in percent: `(likes + comments + shares) / max(views, 1) × 100`.
///
/// Views of zero are treated as one. This keeps the rate defined, but it also
/// means an item with no view data (e.g. an image post) reports its raw
/// interaction count as a percentage: 12 likes on a zero-view post is a
/// 1200% rate. Callers comparing image-heavy and video-heavy sources should
/// keep that in mind.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate(likes: u64, comments: u64, shares: u64, views: u64) -> f64 {
    let interactions = likes.saturating_add(comments).saturating_add(shares);
    let denom = views.max(1);
    (interactions as f64 / denom as f64) * 100.0
}

/// Engagement rate of one item from its own counters.
///
/// Uses the provider-reported `comment_count`, not the number of comments
/// retrieved.
#[must_use]
pub fn item_engagement_rate(item: &ContentItem) -> f64 {
    engagement_rate(item.likes, item.comment_count, item.shares, item.views)
}

/// Method form of [`item_engagement_rate`].
pub trait EngagementExt {
    fn engagement_rate(&self) -> f64;
}

impl EngagementExt for ContentItem {
    fn engagement_rate(&self) -> f64 {
        item_engagement_rate(self)
    }
}

/// Map an average engagement rate onto a performance tier.
///
/// | Rate                      | Tier        |
/// |---------------------------|-------------|
/// | `< low`                   | `Low`       |
/// | `low <= r < medium`       | `Medium`    |
/// | `medium <= r < high`      | `High`      |
/// | `>= high`                 | `Excellent` |
///
/// `PerformanceLevel::None` is reserved for sources with no items and is
/// never returned here.
#[must_use]
pub fn classify(avg_rate: f64, thresholds: &PerformanceThresholds) -> PerformanceLevel {
    if avg_rate < thresholds.low() {
        PerformanceLevel::Low
    } else if avg_rate < thresholds.medium() {
        PerformanceLevel::Medium
    } else if avg_rate < thresholds.high() {
        PerformanceLevel::High
    } else {
        PerformanceLevel::Excellent
    }
}

#[cfg(test)]
mod tests {
    use brandlens_core::ItemDetails;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rate_for_typical_item() {
        assert!(approx(engagement_rate(100, 20, 5, 1000), 12.5));
    }

    #[test]
    fn zero_views_default_to_one() {
        // (3 + 2 + 1) / 1 × 100
        assert!(approx(engagement_rate(3, 2, 1, 0), 600.0));
    }

    #[test]
    fn zero_views_and_zero_interactions_is_zero() {
        assert!(approx(engagement_rate(0, 0, 0, 0), 0.0));
    }

    #[test]
    fn counters_saturate_instead_of_overflowing() {
        let rate = engagement_rate(u64::MAX, 1, 1, u64::MAX);
        assert!(rate.is_finite());
    }

    #[test]
    fn item_rate_uses_reported_comment_count() {
        let item = ContentItem {
            id: "1".to_string(),
            url: "https://example.com/p/1".to_string(),
            caption: String::new(),
            published_at: None,
            likes: 100,
            shares: 5,
            views: 1000,
            comment_count: 20,
            hashtags: Vec::new(),
            content_type: "video".to_string(),
            thumbnail_url: None,
            owner: None,
            comments: Vec::new(),
            details: ItemDetails::default(),
        };
        assert!(approx(item.engagement_rate(), 12.5));
        assert!(approx(item_engagement_rate(&item), 12.5));
    }

    #[test]
    fn classify_below_low_is_low() {
        let t = PerformanceThresholds::default();
        assert_eq!(classify(0.0, &t), PerformanceLevel::Low);
        assert_eq!(classify(0.99, &t), PerformanceLevel::Low);
    }

    #[test]
    fn classify_boundaries_map_to_higher_tier() {
        let t = PerformanceThresholds::default();
        assert_eq!(classify(1.0, &t), PerformanceLevel::Medium);
        assert_eq!(classify(3.0, &t), PerformanceLevel::High);
        assert_eq!(classify(5.0, &t), PerformanceLevel::Excellent);
    }

    #[test]
    fn classify_is_monotonic() {
        let t = PerformanceThresholds::new(0.5, 2.0, 7.5).unwrap();
        let mut previous = PerformanceLevel::None;
        let mut rate = 0.0;
        while rate < 20.0 {
            let level = classify(rate, &t);
            assert!(level >= previous, "tier dropped at rate {rate}");
            previous = level;
            rate += 0.05;
        }
        assert_eq!(previous, PerformanceLevel::Excellent);
    }

    #[test]
    fn classify_uses_configured_boundaries() {
        let t = PerformanceThresholds::new(10.0, 20.0, 30.0).unwrap();
        assert_eq!(classify(12.5, &t), PerformanceLevel::Medium);
        let default = PerformanceThresholds::default();
        assert_eq!(classify(12.5, &default), PerformanceLevel::Excellent);
    }
}
