//! Pulls recent videos from the video platform into the `kajian` table.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::kajian::{Kajian, SyncResponse};
use crate::repositories::KajianRepository;
use crate::services::video::{VideoSource, VideoSourceError};

/// Destination for synced videos.
#[async_trait]
pub trait KajianSink: Send + Sync {
    async fn upsert(&self, item: &Kajian) -> Result<Kajian, AppError>;
}

#[derive(Debug, Clone)]
pub struct PgKajianSink {
    pool: PgPool,
    repo: KajianRepository,
}

impl PgKajianSink {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            repo: KajianRepository::new(),
        }
    }
}

#[async_trait]
impl KajianSink for PgKajianSink {
    async fn upsert(&self, item: &Kajian) -> Result<Kajian, AppError> {
        self.repo.upsert_by_video_id(&self.pool, item).await
    }
}

impl From<VideoSourceError> for AppError {
    fn from(err: VideoSourceError) -> Self {
        AppError::InternalServerError(anyhow::Error::new(err))
    }
}

#[derive(Clone)]
pub struct KajianSyncService {
    source: Arc<dyn VideoSource>,
}

impl KajianSyncService {
    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }

    /// Fetches the last `days` days of videos and upserts each by video id.
    /// Items that fail to persist are logged and skipped.
    pub async fn sync(&self, sink: &dyn KajianSink, days: i64) -> Result<SyncResponse, AppError> {
        let since = Utc::now() - Duration::days(days);
        let videos = self.source.recent_videos(since).await?;
        let fetched = videos.len();

        let mut synced = 0;
        for video in videos {
            let video_id = video.video_id.clone();
            match sink.upsert(&Kajian::from_video(video)).await {
                Ok(_) => synced += 1,
                Err(err) => {
                    tracing::warn!(video_id = %video_id, error = ?err, "failed to store video");
                }
            }
        }

        tracing::info!(fetched, synced, days, "kajian sync finished");
        Ok(SyncResponse {
            synced,
            fetched,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kajian::VideoMetadata;
    use crate::services::video::MockVideoSource;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        stored: Mutex<Vec<Kajian>>,
        reject: Option<&'static str>,
    }

    #[async_trait]
    impl KajianSink for RecordingSink {
        async fn upsert(&self, item: &Kajian) -> Result<Kajian, AppError> {
            if self.reject == Some(item.video_id.as_str()) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("disk full")));
            }
            self.stored.lock().unwrap().push(item.clone());
            Ok(item.clone())
        }
    }

    fn video(id: &str) -> VideoMetadata {
        VideoMetadata {
            video_id: id.into(),
            title: format!("Video {}", id),
            description: None,
            thumbnail_url: None,
            channel_title: None,
            published_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sync_skips_items_that_fail_to_persist() {
        let mut source = MockVideoSource::new();
        source
            .expect_recent_videos()
            .times(1)
            .returning(|_| Ok(vec![video("a"), video("b"), video("c")]));
        let sink = RecordingSink {
            reject: Some("b"),
            ..Default::default()
        };

        let service = KajianSyncService::new(Arc::new(source));
        let result = service.sync(&sink, 30).await.expect("sync");
        assert_eq!(result.fetched, 3);
        assert_eq!(result.synced, 2);

        let stored = sink.stored.lock().unwrap();
        let ids: Vec<_> = stored.iter().map(|k| k.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(stored[0].url, "https://www.youtube.com/watch?v=a");
    }

    #[tokio::test]
    async fn sync_window_starts_days_ago() {
        let mut source = MockVideoSource::new();
        source
            .expect_recent_videos()
            .withf(|since| {
                let age = Utc::now() - *since;
                age >= Duration::days(7) && age < Duration::days(7) + Duration::minutes(1)
            })
            .returning(|_| Ok(Vec::new()));
        let service = KajianSyncService::new(Arc::new(source));
        let result = service
            .sync(&RecordingSink::default(), 7)
            .await
            .expect("sync");
        assert_eq!(result.synced, 0);
        assert_eq!(result.days, 7);
    }

    #[tokio::test]
    async fn missing_configuration_fails_the_sync() {
        let mut source = MockVideoSource::new();
        source
            .expect_recent_videos()
            .returning(|_| Err(VideoSourceError::NotConfigured("YOUTUBE_API_KEY")));
        let service = KajianSyncService::new(Arc::new(source));
        let err = service
            .sync(&RecordingSink::default(), 30)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
