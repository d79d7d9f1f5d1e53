//! Domain types for watch-history data.
//!
//! All three entities are immutable after ingest; the only supported
//! mutation is a full store reset followed by re-ingestion.

use serde::Serialize;

/// Reserved channel identifier for videos without channel metadata
/// (deleted or private source content). Used instead of a nullable FK so
/// `channel_id` is always joinable.
pub const SENTINEL_CHANNEL_ID: &str = "NO_CHANNEL";

/// Display name of the sentinel channel.
pub const SENTINEL_CHANNEL_NAME: &str = "Deleted/Private Videos";

/// The attributed source of one or more videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub channel_id: String,
    pub channel_name: String,
}

impl Channel {
    /// The reserved placeholder channel.
    pub fn sentinel() -> Self {
        Self {
            channel_id: SENTINEL_CHANNEL_ID.to_string(),
            channel_name: SENTINEL_CHANNEL_NAME.to_string(),
        }
    }

    /// Whether this is the sentinel channel.
    pub fn is_sentinel(&self) -> bool {
        self.channel_id == SENTINEL_CHANNEL_ID
    }
}

/// One distinct piece of watchable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub video_id: String,
    /// Title with the UI action prefix already stripped
    pub title: String,
    /// Never null; the sentinel stands in for missing channel metadata
    pub channel_id: String,
}

/// One occurrence of a video being viewed. Repeat rows for the same video
/// are legitimate rewatches, never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub view_id: i64,
    pub video_id: String,
    /// Denormalized copy of the video's channel, for query performance
    pub channel_id: String,
    /// ISO-8601 text, sortable lexicographically
    pub timestamp: String,
}

/// Public channel URL for display, or `None` for the sentinel channel
/// (deleted videos have no channel page).
pub fn channel_url(channel_id: &str) -> Option<String> {
    if channel_id == SENTINEL_CHANNEL_ID {
        return None;
    }
    Some(format!("https://www.youtube.com/channel/{}", channel_id))
}
