//! Client for the external video platform's search API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::YouTubeConfig;
use crate::models::kajian::VideoMetadata;

const PAGE_SIZE: u32 = 50;
const MAX_PAGES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum VideoSourceError {
    #[error("video source is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("invalid video API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("video API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("video API returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Videos published at or after `since`, newest first.
    async fn recent_videos(&self, since: DateTime<Utc>)
        -> Result<Vec<VideoMetadata>, VideoSourceError>;
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Result<Self, VideoSourceError> {
        let client = Client::builder()
            .user_agent("sitecms-backend/1.0")
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<(&str, &str), VideoSourceError> {
        let api_key = self.config.api_key.trim();
        if api_key.is_empty() {
            return Err(VideoSourceError::NotConfigured("YOUTUBE_API_KEY"));
        }
        let channel_id = self.config.channel_id.trim();
        if channel_id.is_empty() {
            return Err(VideoSourceError::NotConfigured("YOUTUBE_CHANNEL_ID"));
        }
        Ok((api_key, channel_id))
    }

    fn search_url(
        &self,
        api_key: &str,
        channel_id: &str,
        since: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<Url, VideoSourceError> {
        let mut url = Url::parse(&self.config.api_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "snippet")
                .append_pair("channelId", channel_id)
                .append_pair("type", "video")
                .append_pair("order", "date")
                .append_pair("maxResults", &PAGE_SIZE.to_string())
                .append_pair("publishedAfter", &since.to_rfc3339())
                .append_pair("key", api_key);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn recent_videos(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<VideoMetadata>, VideoSourceError> {
        let (api_key, channel_id) = self.credentials()?;
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = self.search_url(api_key, channel_id, since, page_token.as_deref())?;
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(VideoSourceError::Api {
                    status: status.as_u16(),
                    body: body.chars().take(512).collect(),
                });
            }

            let page: SearchResponse = response.json().await?;
            videos.extend(page.items.into_iter().filter_map(SearchItem::into_video));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = videos.len(), since = %since, "fetched videos");
        Ok(videos)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: Option<String>,
    published_at: DateTime<Utc>,
    channel_title: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl SearchItem {
    /// Channel and playlist hits carry no video id and are dropped.
    fn into_video(self) -> Option<VideoMetadata> {
        let video_id = self.id.video_id.filter(|id| !id.is_empty())?;
        let snippet = self.snippet?;
        let thumbnails = snippet.thumbnails;
        let thumbnail_url = thumbnails
            .high
            .or(thumbnails.medium)
            .or(thumbnails.default)
            .map(|t| t.url);
        Some(VideoMetadata {
            video_id,
            title: snippet.title,
            description: snippet.description,
            thumbnail_url,
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, channel_id: &str) -> YouTubeConfig {
        YouTubeConfig {
            api_key: api_key.to_string(),
            channel_id: channel_id.to_string(),
            api_url: "https://www.googleapis.com/youtube/v3/search".into(),
        }
    }

    #[test]
    fn search_response_keeps_only_videos() {
        let body = r#"{
            "nextPageToken": "CAUQAA",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"},
                 "snippet": {"title": "Tafsir", "description": "", "publishedAt": "2026-01-02T03:04:05Z",
                             "channelTitle": "Masjid",
                             "thumbnails": {"default": {"url": "https://i.ytimg.com/d.jpg"},
                                            "high": {"url": "https://i.ytimg.com/h.jpg"}}}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"},
                 "snippet": {"title": "Channel", "publishedAt": "2026-01-01T00:00:00Z"}}
            ]
        }"#;
        let page: SearchResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        let videos: Vec<_> = page.items.into_iter().filter_map(SearchItem::into_video).collect();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "abc123");
        assert_eq!(
            videos[0].thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/h.jpg")
        );
    }

    #[test]
    fn search_url_carries_window_and_credentials() {
        let client = YouTubeClient::new(config("k", "UC1")).expect("client");
        let since = "2026-01-01T00:00:00Z".parse().expect("ts");
        let url = client
            .search_url("k", "UC1", since, Some("NEXT"))
            .expect("url");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["channelId"], "UC1");
        assert_eq!(pairs["key"], "k");
        assert_eq!(pairs["pageToken"], "NEXT");
        assert_eq!(pairs["order"], "date");
        assert!(pairs["publishedAfter"].starts_with("2026-01-01T00:00:00"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let client = YouTubeClient::new(config("", "UC1")).expect("client");
        let err = client.recent_videos(Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            VideoSourceError::NotConfigured("YOUTUBE_API_KEY")
        ));

        let client = YouTubeClient::new(config("k", "")).expect("client");
        let err = client.recent_videos(Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            VideoSourceError::NotConfigured("YOUTUBE_CHANNEL_ID")
        ));
    }
}
