//! Videos synced from the external video platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::KajianId;

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
pub const DEFAULT_SYNC_DAYS: i64 = 30;
pub const MAX_SYNC_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Kajian {
    pub id: KajianId,
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub url: String,
    pub channel_title: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Kajian {
    pub fn from_video(video: VideoMetadata) -> Self {
        let now = Utc::now();
        Self {
            id: KajianId::new(),
            url: watch_url(&video.video_id),
            video_id: video.video_id,
            title: video.title,
            description: video.description.filter(|d| !d.is_empty()),
            thumbnail_url: video.thumbnail_url,
            channel_title: video.channel_title,
            published_at: video.published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// One video as reported by the platform search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: DateTime<Utc>,
}

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncQuery {
    pub days: Option<i64>,
}

impl SyncQuery {
    /// Look-back window in days; non-positive or missing means the default.
    pub fn days(&self) -> i64 {
        match self.days {
            Some(days) if days > 0 => days.min(MAX_SYNC_DAYS),
            _ => DEFAULT_SYNC_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub synced: usize,
    pub fetched: usize,
    pub days: i64,
}
