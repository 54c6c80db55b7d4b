//! Retrieved content: platforms, items, and their comments.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A social platform that content can be retrieved from.
///
/// Declaration order is the default registration order and therefore the
/// tie-break order for cross-source ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Instagram, Platform::Tiktok, Platform::Youtube];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "youtube" => Ok(Platform::Youtube),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

/// One retrieved post or video, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub url: String,
    pub caption: String,
    pub published_at: Option<DateTime<Utc>>,
    pub likes: u64,
    pub shares: u64,
    pub views: u64,
    /// Comment count as reported by the provider, not `comments.len()`.
    pub comment_count: u64,
    /// Hashtags without the leading `#`, in the order they appear.
    pub hashtags: Vec<String>,
    /// Provider content-type tag, e.g. `video`, `image`, `sidecar`.
    pub content_type: String,
    pub thumbnail_url: Option<String>,
    pub owner: Option<String>,
    /// Empty until comment retrieval runs for this item.
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub details: ItemDetails,
}

/// Platform-specific extras. Not used by the metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDetails {
    /// Long-form description, truncated to [`ItemDetails::DESCRIPTION_CHARS`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// As reported, e.g. `00:04:31`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_followers: Option<u64>,
    /// Comments embedded in the item listing, at most
    /// [`ItemDetails::PREVIEW_COMMENTS`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preview_comments: Vec<CommentPreview>,
}

impl ItemDetails {
    pub const DESCRIPTION_CHARS: usize = 500;
    pub const PREVIEW_COMMENTS: usize = 3;

    /// Keeps the first [`Self::DESCRIPTION_CHARS`] characters; blank text is
    /// `None`.
    #[must_use]
    pub fn truncated_description(text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.chars().take(Self::DESCRIPTION_CHARS).collect())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPreview {
    pub author: String,
    pub text: String,
    pub likes: u64,
}

/// A single comment attached to a [`ContentItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: CommentDetails,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentDetails {
    pub reply_count: u64,
    /// YouTube "hearted by creator".
    pub creator_heart: bool,
}
