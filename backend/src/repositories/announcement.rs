//! Announcement repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::announcement::Announcement;
use crate::repositories::common::LiveTable;
use crate::repositories::repository::Repository;
use crate::types::AnnouncementId;

const TABLE_NAME: &str = "announcements";
const SELECT_COLUMNS: &str = "id, title, content, image_url, is_published, published_at, \
                              created_at, updated_at, deleted_at";
const PUBLISHED: &str = "is_published = TRUE";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "created_at DESC",
    entity: "Announcement",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AnnouncementRepository;

impl AnnouncementRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_published_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Announcement>, i64), AppError> {
        LIVE.fetch_page(db, Some(PUBLISHED), limit, offset).await
    }

    pub async fn find_published_by_id(
        &self,
        db: &PgPool,
        id: AnnouncementId,
    ) -> Result<Announcement, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), Some(PUBLISHED)).await
    }
}

impl Repository<Announcement> for AnnouncementRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = AnnouncementId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Announcement>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(&self, db: &PgPool, id: AnnouncementId) -> Result<Announcement, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(&self, db: &PgPool, item: &Announcement) -> Result<Announcement, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, content, image_url, is_published, published_at, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Announcement>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.content)
            .bind(&item.image_url)
            .bind(item.is_published)
            .bind(item.published_at)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Announcement) -> Result<Announcement, AppError> {
        let query = format!(
            "UPDATE {} SET title = $2, content = $3, image_url = $4, is_published = $5, \
             published_at = $6, updated_at = $7 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.content)
            .bind(&item.image_url)
            .bind(item.is_published)
            .bind(item.published_at)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: AnnouncementId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
