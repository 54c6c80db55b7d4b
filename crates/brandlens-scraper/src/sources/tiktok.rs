//! TikTok via `clockworks~tiktok-scraper` (videos) and
//! `clockworks~tiktok-comments-scraper` (comments).

use std::sync::Arc;

use async_trait::async_trait;
use brandlens_core::{Comment, CommentDetails, ContentItem, ItemDetails, Platform};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::SourceAdapter;
use crate::apify::{ApifyClient, TIKTOK_ACTOR, TIKTOK_COMMENTS_ACTOR};
use crate::error::ScraperError;
use crate::parse_helpers::{
    from_value, hashtags_from_text, lenient_count, lenient_id, parse_each, parse_timestamp,
    required,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideosInput {
    profiles: Vec<String>,
    results_per_page: usize,
    should_download_videos: bool,
    should_download_covers: bool,
    should_download_subtitles: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentsInput<'a> {
    #[serde(rename = "postURLs")]
    post_urls: [&'a str; 1],
    max_comments: usize,
    max_replies_per_comment: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoMeta {
    #[serde(default)]
    cover_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorMeta {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    web_video_url: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "createTimeISO")]
    create_time_iso: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    digg_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    comment_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    share_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    play_count: u64,
    #[serde(default)]
    video_meta: Option<VideoMeta>,
    #[serde(default)]
    author_meta: Option<AuthorMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    #[serde(default, alias = "cid", deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "uniqueId")]
    author_name: Option<String>,
    #[serde(default, rename = "createTimeISO")]
    create_time_iso: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    digg_count: u64,
}

/// Profile handle from a profile url: `https://www.tiktok.com/@acme/` → `acme`.
/// Input without `/@` is taken as a bare handle.
#[must_use]
pub fn username_from_profile(profile_ref: &str) -> String {
    let trimmed = profile_ref.trim().trim_end_matches('/');
    let handle = trimmed.rsplit("/@").next().unwrap_or(trimmed);
    handle.trim_start_matches('@').to_string()
}

/// Parses one video from the videos dataset. Hashtags come from the caption.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item lacks an id or url.
pub fn parse_video(value: Value) -> Result<ContentItem, ScraperError> {
    let raw: RawVideo = from_value(value, "tiktok video")?;
    let id = required(raw.id, "id", "tiktok video")?;
    let url = required(raw.web_video_url, "webVideoUrl", "tiktok video")?;
    let caption = raw.text.unwrap_or_default();

    Ok(ContentItem {
        id,
        url,
        hashtags: hashtags_from_text(&caption),
        caption,
        published_at: parse_timestamp(raw.create_time_iso.as_deref()),
        likes: raw.digg_count,
        shares: raw.share_count,
        views: raw.play_count,
        comment_count: raw.comment_count,
        content_type: "video".to_string(),
        thumbnail_url: raw
            .video_meta
            .and_then(|m| m.cover_url)
            .filter(|u| !u.is_empty()),
        owner: raw.author_meta.and_then(|m| m.name),
        comments: Vec::new(),
        details: ItemDetails::default(),
    })
}

/// Parses one comment from the comments dataset.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item lacks an id.
pub fn parse_comment(value: Value) -> Result<Comment, ScraperError> {
    let raw: RawComment = from_value(value, "tiktok comment")?;
    Ok(Comment {
        id: required(raw.id, "id", "tiktok comment")?,
        author: raw.author_name.unwrap_or_else(|| "unknown".to_string()),
        text: raw.text.unwrap_or_default(),
        likes: raw.digg_count,
        published_at: parse_timestamp(raw.create_time_iso.as_deref()),
        details: CommentDetails::default(),
    })
}

pub struct TiktokAdapter {
    client: Arc<ApifyClient>,
}

impl TiktokAdapter {
    #[must_use]
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for TiktokAdapter {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn fetch_items(
        &self,
        profile_ref: &str,
        max_items: usize,
    ) -> Result<Vec<ContentItem>, ScraperError> {
        let input = VideosInput {
            profiles: vec![username_from_profile(profile_ref)],
            results_per_page: max_items,
            should_download_videos: false,
            should_download_covers: false,
            should_download_subtitles: false,
        };
        let raw = self.client.run_actor(TIKTOK_ACTOR, &input).await?;
        let items = parse_each(raw, max_items, "tiktok video", parse_video);
        tracing::info!(source = "tiktok", profile_ref, count = items.len(), "retrieved items");
        Ok(items)
    }

    async fn fetch_comments(
        &self,
        item_ref: &str,
        max_comments: usize,
    ) -> Result<Vec<Comment>, ScraperError> {
        let input = CommentsInput {
            post_urls: [item_ref],
            max_comments,
            max_replies_per_comment: 0,
        };
        let raw = self.client.run_actor(TIKTOK_COMMENTS_ACTOR, &input).await?;
        let comments = parse_each(raw, max_comments, "tiktok comment", parse_comment);
        tracing::debug!(source = "tiktok", item_ref, count = comments.len(), "retrieved comments");
        Ok(comments)
    }
}
