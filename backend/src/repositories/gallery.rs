//! Gallery repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::gallery::GalleryItem;
use crate::repositories::common::LiveTable;
use crate::repositories::repository::Repository;
use crate::types::GalleryId;

const TABLE_NAME: &str = "gallery";
const SELECT_COLUMNS: &str =
    "id, title, description, image_url, created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "created_at DESC",
    entity: "Gallery item",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct GalleryRepository;

impl GalleryRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Repository<GalleryItem> for GalleryRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = GalleryId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<GalleryItem>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(&self, db: &PgPool, id: GalleryId) -> Result<GalleryItem, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(&self, db: &PgPool, item: &GalleryItem) -> Result<GalleryItem, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, description, image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, GalleryItem>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &GalleryItem) -> Result<GalleryItem, AppError> {
        let query = format!(
            "UPDATE {} SET title = $2, description = $3, image_url = $4, updated_at = $5 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, GalleryItem>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: GalleryId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
