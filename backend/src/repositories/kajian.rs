//! Kajian (synced video) repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::kajian::Kajian;
use crate::repositories::common::LiveTable;
use crate::types::KajianId;

const TABLE_NAME: &str = "kajian";
const SELECT_COLUMNS: &str = "id, video_id, title, description, thumbnail_url, url, \
                              channel_title, published_at, created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "published_at DESC",
    entity: "Kajian",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct KajianRepository;

impl KajianRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Kajian>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    pub async fn find_by_id(&self, db: &PgPool, id: KajianId) -> Result<Kajian, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    /// Inserts or refreshes the row for `item.video_id`. A previously
    /// deleted video stays deleted; its metadata is still refreshed.
    pub async fn upsert_by_video_id(&self, db: &PgPool, item: &Kajian) -> Result<Kajian, AppError> {
        let query = format!(
            "INSERT INTO {} (id, video_id, title, description, thumbnail_url, url, \
             channel_title, published_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (video_id) DO UPDATE SET title = EXCLUDED.title, \
             description = EXCLUDED.description, thumbnail_url = EXCLUDED.thumbnail_url, \
             url = EXCLUDED.url, channel_title = EXCLUDED.channel_title, \
             published_at = EXCLUDED.published_at, updated_at = EXCLUDED.updated_at \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Kajian>(&query)
            .bind(item.id)
            .bind(&item.video_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.thumbnail_url)
            .bind(&item.url)
            .bind(&item.channel_title)
            .bind(item.published_at)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    pub async fn delete(&self, db: &PgPool, id: KajianId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
