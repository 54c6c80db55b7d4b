//! YouTube via `streamers~youtube-scraper` (videos) and
//! `streamers~youtube-comments-scraper` (comments).
//!
//! Shorts and live streams are excluded from retrieval. YouTube exposes no
//! share count. Comment times are relative ("3 weeks ago") and usually end
//! up as `None`.

use std::sync::Arc;

use async_trait::async_trait;
use brandlens_core::{Comment, CommentDetails, ContentItem, ItemDetails, Platform};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::SourceAdapter;
use crate::apify::{ApifyClient, YOUTUBE_ACTOR, YOUTUBE_COMMENTS_ACTOR};
use crate::error::ScraperError;
use crate::parse_helpers::{
    from_value, hashtags_from_text, lenient_count, lenient_id, parse_each, parse_timestamp,
    required,
};

#[derive(Debug, Serialize)]
struct StartUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideosInput<'a> {
    start_urls: [StartUrl<'a>; 1],
    max_results: usize,
    max_results_shorts: u32,
    max_result_streams: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentsInput<'a> {
    start_urls: [StartUrl<'a>; 1],
    max_comments: usize,
    comments_sort_by: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    likes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    comments_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    view_count: u64,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    channel_name: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    number_of_subscribers: u64,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    #[serde(default, deserialize_with = "lenient_id")]
    cid: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    vote_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    reply_count: u64,
    #[serde(default)]
    has_creator_heart: Option<bool>,
}

/// Parses one video. The caption is the title; hashtags come from the
/// description.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item lacks an id or url.
pub fn parse_video(value: Value) -> Result<ContentItem, ScraperError> {
    let raw: RawVideo = from_value(value, "youtube video")?;
    let id = required(raw.id, "id", "youtube video")?;
    let url = required(raw.url, "url", "youtube video")?;
    let description = raw.text.unwrap_or_default();

    Ok(ContentItem {
        id,
        url,
        caption: raw.title.unwrap_or_default(),
        published_at: parse_timestamp(raw.date.as_deref()),
        likes: raw.likes,
        shares: 0,
        views: raw.view_count,
        comment_count: raw.comments_count,
        hashtags: hashtags_from_text(&description),
        content_type: "video".to_string(),
        thumbnail_url: raw.thumbnail_url.filter(|u| !u.is_empty()),
        owner: raw.channel_name,
        comments: Vec::new(),
        details: ItemDetails {
            description: ItemDetails::truncated_description(&description),
            duration: raw.duration.filter(|d| !d.is_empty()),
            channel_id: raw.channel_id.filter(|c| !c.is_empty()),
            owner_followers: (raw.number_of_subscribers > 0).then_some(raw.number_of_subscribers),
            ..ItemDetails::default()
        },
    })
}

/// Parses one comment.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the item lacks a `cid`.
pub fn parse_comment(value: Value) -> Result<Comment, ScraperError> {
    let raw: RawComment = from_value(value, "youtube comment")?;
    Ok(Comment {
        id: required(raw.cid, "cid", "youtube comment")?,
        author: raw.author.unwrap_or_else(|| "unknown".to_string()),
        text: raw.comment.unwrap_or_default(),
        likes: raw.vote_count,
        published_at: parse_timestamp(raw.time.as_deref()),
        details: CommentDetails {
            reply_count: raw.reply_count,
            creator_heart: raw.has_creator_heart.unwrap_or(false),
        },
    })
}

pub struct YoutubeAdapter {
    client: Arc<ApifyClient>,
}

impl YoutubeAdapter {
    #[must_use]
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for YoutubeAdapter {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn fetch_items(
        &self,
        profile_ref: &str,
        max_items: usize,
    ) -> Result<Vec<ContentItem>, ScraperError> {
        let input = VideosInput {
            start_urls: [StartUrl { url: profile_ref }],
            max_results: max_items,
            max_results_shorts: 0,
            max_result_streams: 0,
        };
        let raw = self.client.run_actor(YOUTUBE_ACTOR, &input).await?;
        let items = parse_each(raw, max_items, "youtube video", parse_video);
        tracing::info!(source = "youtube", profile_ref, count = items.len(), "retrieved items");
        Ok(items)
    }

    async fn fetch_comments(
        &self,
        item_ref: &str,
        max_comments: usize,
    ) -> Result<Vec<Comment>, ScraperError> {
        let input = CommentsInput {
            start_urls: [StartUrl { url: item_ref }],
            max_comments,
            // "1" is top comments, "0" newest first
            comments_sort_by: "1",
        };
        let raw = self.client.run_actor(YOUTUBE_COMMENTS_ACTOR, &input).await?;
        let comments = parse_each(raw, max_comments, "youtube comment", parse_comment);
        tracing::debug!(source = "youtube", item_ref, count = comments.len(), "retrieved comments");
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_video_with_description_hashtags() {
        let item = parse_video(json!({
            "id": "dQw4w9WgXcQ",
            "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "title": "Our new campaign",
            "text": "Full story below #campaign #design",
            "date": "2024-02-10T15:00:00.000Z",
            "likes": 350,
            "commentsCount": 40,
            "viewCount": 12000,
            "thumbnailUrl": "https://i.ytimg.com/vi/x/hq.jpg",
            "channelName": "Acme Studio"
        }))
        .unwrap();

        assert_eq!(item.caption, "Our new campaign");
        assert_eq!(item.hashtags, vec!["campaign", "design"]);
        assert_eq!(item.views, 12000);
        assert_eq!(item.shares, 0);
        assert_eq!(item.owner.as_deref(), Some("Acme Studio"));
        assert_eq!(
            item.details.description.as_deref(),
            Some("Full story below #campaign #design")
        );
        assert!(item.details.duration.is_none());
    }

    #[test]
    fn keeps_channel_details_and_truncates_description() {
        let item = parse_video(json!({
            "id": "b",
            "url": "https://www.youtube.com/watch?v=b",
            "text": "x".repeat(800),
            "duration": "00:04:31",
            "channelId": "UC123",
            "numberOfSubscribers": 15400
        }))
        .unwrap();
        assert_eq!(item.details.description.map(|d| d.len()), Some(500));
        assert_eq!(item.details.duration.as_deref(), Some("00:04:31"));
        assert_eq!(item.details.channel_id.as_deref(), Some("UC123"));
        assert_eq!(item.details.owner_followers, Some(15400));
    }

    #[test]
    fn view_count_string_is_parsed() {
        let item = parse_video(json!({
            "id": "a",
            "url": "https://www.youtube.com/watch?v=a",
            "viewCount": "1,500"
        }))
        .unwrap();
        assert_eq!(item.views, 1500);
    }

    #[test]
    fn comment_with_relative_time() {
        let comment = parse_comment(json!({
            "cid": "Ugx1",
            "comment": "great editing",
            "author": "@viewer",
            "time": "3 weeks ago",
            "voteCount": 8
        }))
        .unwrap();
        assert_eq!(comment.id, "Ugx1");
        assert_eq!(comment.likes, 8);
        assert!(comment.published_at.is_none());
        assert_eq!(comment.details, CommentDetails::default());
    }

    #[test]
    fn comment_keeps_replies_and_creator_heart() {
        let comment = parse_comment(json!({
            "cid": "Ugx2",
            "comment": "thanks!",
            "replyCount": 4,
            "hasCreatorHeart": true
        }))
        .unwrap();
        assert_eq!(comment.details.reply_count, 4);
        assert!(comment.details.creator_heart);
    }

    #[test]
    fn comment_without_cid_is_rejected() {
        assert!(parse_comment(json!({"comment": "orphan"})).is_err());
    }

    #[test]
    fn videos_input_excludes_shorts_and_streams() {
        let input = VideosInput {
            start_urls: [StartUrl {
                url: "https://www.youtube.com/@acme",
            }],
            max_results: 10,
            max_results_shorts: 0,
            max_result_streams: 0,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "startUrls": [{"url": "https://www.youtube.com/@acme"}],
                "maxResults": 10,
                "maxResultsShorts": 0,
                "maxResultStreams": 0
            })
        );
    }
}
