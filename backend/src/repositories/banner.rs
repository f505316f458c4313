//! Banner repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::banner::Banner;
use crate::repositories::common::LiveTable;
use crate::repositories::repository::Repository;
use crate::types::BannerId;

const TABLE_NAME: &str = "banners";
const SELECT_COLUMNS: &str = "id, title, description, media_url, banner_type, link_url, \
                              is_active, sort_order, created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "sort_order ASC, created_at DESC",
    entity: "Banner",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct BannerRepository;

impl BannerRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Repository<Banner> for BannerRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = BannerId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Banner>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(&self, db: &PgPool, id: BannerId) -> Result<Banner, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(&self, db: &PgPool, item: &Banner) -> Result<Banner, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, description, media_url, banner_type, link_url, \
             is_active, sort_order, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Banner>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.media_url)
            .bind(item.banner_type)
            .bind(&item.link_url)
            .bind(item.is_active)
            .bind(item.sort_order)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Banner) -> Result<Banner, AppError> {
        let query = format!(
            "UPDATE {} SET title = $2, description = $3, media_url = $4, banner_type = $5, \
             link_url = $6, is_active = $7, sort_order = $8, updated_at = $9 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.media_url)
            .bind(item.banner_type)
            .bind(&item.link_url)
            .bind(item.is_active)
            .bind(item.sort_order)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: BannerId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
