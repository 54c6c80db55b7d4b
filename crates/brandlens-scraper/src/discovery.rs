//! Profile discovery: find a brand's profile urls when none were supplied.
//!
//! [`ApifySearchResolver`] runs one `site:` Google search per platform through
//! the Apify search actor and keeps the organic-result urls that look like
//! profile pages (not posts, reels, or videos).

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use brandlens_core::Platform;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::apify::{ApifyClient, GOOGLE_SEARCH_ACTOR};
use crate::error::ScraperError;
use crate::throttle::RateLimiter;

/// Maximum profile urls kept per platform.
pub const MAX_URLS_PER_PLATFORM: usize = 5;

/// Finds candidate profile references for a brand.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Candidate references per requested platform, best first. Platforms
    /// with no candidates may be absent or map to an empty list.
    async fn resolve(
        &self,
        brand: &str,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, Vec<String>>, ScraperError>;
}

static INSTAGRAM_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?instagram\.com/([a-zA-Z0-9._]+)/?")
        .expect("valid instagram profile regex")
});

static TIKTOK_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?tiktok\.com/@([a-zA-Z0-9._]+)/?")
        .expect("valid tiktok profile regex")
});

static YOUTUBE_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?youtube\.com/(?:@|c/|channel/|user/)([a-zA-Z0-9_-]+)/?")
        .expect("valid youtube profile regex")
});

/// First path segments on instagram.com that are never a profile handle.
const INSTAGRAM_RESERVED: &[&str] = &[
    "explore", "accounts", "stories", "p", "reel", "reels", "tv", "direct",
];

fn profile_pattern(platform: Platform) -> &'static Regex {
    match platform {
        Platform::Instagram => &INSTAGRAM_PROFILE,
        Platform::Tiktok => &TIKTOK_PROFILE,
        Platform::Youtube => &YOUTUBE_PROFILE,
    }
}

fn site_domain(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => "instagram.com",
        Platform::Tiktok => "tiktok.com",
        Platform::Youtube => "youtube.com",
    }
}

/// `site:<domain> "<brand>"`
#[must_use]
pub fn search_query(brand: &str, platform: Platform) -> String {
    format!("site:{} \"{}\"", site_domain(platform), brand.trim())
}

/// Drops the query string and any trailing slashes.
#[must_use]
pub fn clean_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query.trim_end_matches('/').to_string()
}

/// Whether a cleaned url points at a profile rather than a single post.
#[must_use]
pub fn is_profile_url(url: &str, platform: Platform) -> bool {
    let post_markers: &[&str] = match platform {
        Platform::Instagram => &["/p/", "/reel/", "/tv/"],
        Platform::Tiktok => &["/video/"],
        Platform::Youtube => &["/watch", "/shorts/"],
    };
    if post_markers.iter().any(|m| url.contains(m)) {
        return false;
    }
    let Some(caps) = profile_pattern(platform).captures(url) else {
        return false;
    };
    let (Some(whole), Some(handle)) = (caps.get(0), caps.get(1)) else {
        return false;
    };
    if whole.start() != 0 || clean_url(whole.as_str()) != url {
        return false;
    }
    !(platform == Platform::Instagram && INSTAGRAM_RESERVED.contains(&handle.as_str()))
}

/// Profile urls found in search-actor output for one platform.
///
/// Scans the url, title, and description of each organic result for the
/// platform's profile prefix, so `tiktok.com/@acme/video/1` yields
/// `https://www.tiktok.com/@acme`. Keeps first-seen order, removes
/// duplicates, and caps at [`MAX_URLS_PER_PLATFORM`].
#[must_use]
pub fn extract_profile_urls(items: &[Value], platform: Platform) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    let results = items
        .iter()
        .filter_map(|item| item.get("organicResults").and_then(Value::as_array))
        .flatten();

    for result in results {
        let field = |name: &str| result.get(name).and_then(Value::as_str).unwrap_or("");
        let combined = format!("{} {} {}", field("url"), field("title"), field("description"));

        for found_match in profile_pattern(platform).find_iter(&combined) {
            let cleaned = clean_url(found_match.as_str());
            if is_profile_url(&cleaned, platform) && !found.contains(&cleaned) {
                found.push(cleaned);
                if found.len() == MAX_URLS_PER_PLATFORM {
                    return found;
                }
            }
        }
    }

    found
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput<'a> {
    queries: String,
    results_per_page: u32,
    max_pages_per_query: u32,
    language_code: &'a str,
    mobile_results: bool,
    include_unfiltered_results: bool,
}

/// [`ProfileResolver`] backed by the Apify Google-search actor.
pub struct ApifySearchResolver {
    client: Arc<ApifyClient>,
    limiter: RateLimiter,
    language_code: String,
}

impl ApifySearchResolver {
    #[must_use]
    pub fn new(client: Arc<ApifyClient>, limiter: RateLimiter) -> Self {
        Self {
            client,
            limiter,
            language_code: "it".to_string(),
        }
    }

    /// Search-result language (default `it`).
    #[must_use]
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    async fn search(&self, brand: &str, platform: Platform) -> Result<Vec<String>, ScraperError> {
        let input = SearchInput {
            queries: search_query(brand, platform),
            results_per_page: 10,
            max_pages_per_query: 1,
            language_code: &self.language_code,
            mobile_results: false,
            include_unfiltered_results: false,
        };
        let items = self.client.run_actor(GOOGLE_SEARCH_ACTOR, &input).await?;
        Ok(extract_profile_urls(&items, platform))
    }
}

#[async_trait]
impl ProfileResolver for ApifySearchResolver {
    async fn resolve(
        &self,
        brand: &str,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, Vec<String>>, ScraperError> {
        let mut resolved = BTreeMap::new();

        for (index, &platform) in platforms.iter().enumerate() {
            let urls = match self.search(brand, platform).await {
                Ok(urls) => urls,
                Err(e) => {
                    tracing::error!(brand, source = %platform, error = %e, "profile search failed");
                    Vec::new()
                }
            };

            if urls.is_empty() {
                tracing::warn!(brand, source = %platform, "no profile urls found");
            } else {
                tracing::info!(brand, source = %platform, count = urls.len(), "profile urls found");
            }
            resolved.insert(platform, urls);

            if index + 1 < platforms.len() {
                self.limiter.throttle_search().await;
            }
        }

        Ok(resolved)
    }
}
