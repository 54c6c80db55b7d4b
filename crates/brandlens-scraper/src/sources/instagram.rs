//! Instagram via `apify~instagram-scraper`.
//!
//! One actor serves both posts and comments; `resultsType` selects which.
//! Instagram does not expose share counts, and view counts exist only for
//! `Video` posts, so image posts always report zero views.

use std::sync::Arc;

use async_trait::async_trait;
use brandlens_core::{
    Comment, CommentDetails, CommentPreview, ContentItem, ItemDetails, Platform,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::SourceAdapter;
use crate::apify::{ApifyClient, INSTAGRAM_ACTOR};
use crate::error::ScraperError;
use crate::parse_helpers::{
    from_value, lenient_count, lenient_id, parse_each, parse_timestamp, required,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScraperInput<'a> {
    direct_urls: [&'a str; 1],
    results_type: &'static str,
    results_limit: usize,
    search_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    add_parent_data: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPost {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "type")]
    post_type: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    likes_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    comments_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    video_view_count: u64,
    #[serde(default)]
    display_url: Option<String>,
    #[serde(default)]
    owner_username: Option<String>,
    #[serde(default)]
    hashtags: Option<Vec<String>>,
    #[serde(default)]
    mentions: Option<Vec<String>>,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default)]
    latest_comments: Option<Vec<Value>>,
}

/// Entry of the `latestComments` preview embedded in a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreviewComment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    owner_username: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    likes_count: u64,
}

fn preview_comments(raw: Vec<Value>) -> Vec<CommentPreview> {
    raw.into_iter()
        .filter_map(|v| serde_json::from_value::<RawPreviewComment>(v).ok())
        .take(ItemDetails::PREVIEW_COMMENTS)
        .map(|c| CommentPreview {
            author: c.owner_username.unwrap_or_else(|| "unknown".to_string()),
            text: c.text.unwrap_or_default(),
            likes: c.likes_count,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    owner_username: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    likes_count: u64,
}

/// Parses one post from the posts dataset.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item is not an object or lacks an
/// id or url.
pub fn parse_post(value: Value) -> Result<ContentItem, ScraperError> {
    let raw: RawPost = from_value(value, "instagram post")?;
    let id = required(raw.id, "id", "instagram post")?;
    let url = required(raw.url, "url", "instagram post")?;

    let post_type = raw.post_type.unwrap_or_default();
    let views = if post_type == "Video" {
        raw.video_view_count
    } else {
        0
    };
    let content_type = if post_type.is_empty() {
        "unknown".to_string()
    } else {
        post_type.to_lowercase()
    };

    Ok(ContentItem {
        id,
        url,
        caption: raw.caption.unwrap_or_default(),
        published_at: parse_timestamp(raw.timestamp.as_deref()),
        likes: raw.likes_count,
        shares: 0,
        views,
        comment_count: raw.comments_count,
        hashtags: raw.hashtags.unwrap_or_default(),
        content_type,
        thumbnail_url: raw.display_url.filter(|u| !u.is_empty()),
        owner: raw.owner_username,
        comments: Vec::new(),
        details: ItemDetails {
            mentions: raw.mentions.unwrap_or_default(),
            location: raw.location_name.filter(|l| !l.is_empty()),
            preview_comments: preview_comments(raw.latest_comments.unwrap_or_default()),
            ..ItemDetails::default()
        },
    })
}

/// Parses one comment from the comments dataset.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item lacks an id.
pub fn parse_comment(value: Value) -> Result<Comment, ScraperError> {
    let raw: RawComment = from_value(value, "instagram comment")?;
    Ok(Comment {
        id: required(raw.id, "id", "instagram comment")?,
        author: raw.owner_username.unwrap_or_else(|| "unknown".to_string()),
        text: raw.text.unwrap_or_default(),
        likes: raw.likes_count,
        published_at: parse_timestamp(raw.timestamp.as_deref()),
        details: CommentDetails::default(),
    })
}

pub struct InstagramAdapter {
    client: Arc<ApifyClient>,
}

impl InstagramAdapter {
    #[must_use]
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn fetch_items(
        &self,
        profile_ref: &str,
        max_items: usize,
    ) -> Result<Vec<ContentItem>, ScraperError> {
        let input = ScraperInput {
            direct_urls: [profile_ref],
            results_type: "posts",
            results_limit: max_items,
            search_limit: 1,
            add_parent_data: Some(true),
        };
        let raw = self.client.run_actor(INSTAGRAM_ACTOR, &input).await?;
        let items = parse_each(raw, max_items, "instagram post", parse_post);
        tracing::info!(source = "instagram", profile_ref, count = items.len(), "retrieved items");
        Ok(items)
    }

    async fn fetch_comments(
        &self,
        item_ref: &str,
        max_comments: usize,
    ) -> Result<Vec<Comment>, ScraperError> {
        let input = ScraperInput {
            direct_urls: [item_ref],
            results_type: "comments",
            results_limit: max_comments,
            search_limit: 1,
            add_parent_data: None,
        };
        let raw = self.client.run_actor(INSTAGRAM_ACTOR, &input).await?;
        let comments = parse_each(raw, max_comments, "instagram comment", parse_comment);
        tracing::debug!(source = "instagram", item_ref, count = comments.len(), "retrieved comments");
        Ok(comments)
    }
}
