//! Donation category repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::donation::DonationCategory;
use crate::repositories::common::LiveTable;
use crate::repositories::repository::Repository;
use crate::types::DonationCategoryId;

const TABLE_NAME: &str = "donation_categories";
const SELECT_COLUMNS: &str = "id, name, description, created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "name ASC",
    entity: "Donation category",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DonationCategoryRepository;

impl DonationCategoryRepository {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive name check among live categories, optionally
    /// ignoring the category being renamed.
    pub async fn name_taken(
        &self,
        db: &PgPool,
        name: &str,
        exclude: Option<DonationCategoryId>,
    ) -> Result<bool, AppError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE LOWER(name) = LOWER($1) \
             AND deleted_at IS NULL AND ($2::uuid IS NULL OR id <> $2))",
            TABLE_NAME
        );
        let taken = sqlx::query_scalar::<_, bool>(&query)
            .bind(name.trim())
            .bind(exclude)
            .fetch_one(db)
            .await?;
        Ok(taken)
    }

    pub async fn exists(&self, db: &PgPool, id: DonationCategoryId) -> Result<bool, AppError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND deleted_at IS NULL)",
            TABLE_NAME
        );
        let exists = sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .fetch_one(db)
            .await?;
        Ok(exists)
    }
}

impl Repository<DonationCategory> for DonationCategoryRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = DonationCategoryId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DonationCategory>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(
        &self,
        db: &PgPool,
        id: DonationCategoryId,
    ) -> Result<DonationCategory, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(
        &self,
        db: &PgPool,
        item: &DonationCategory,
    ) -> Result<DonationCategory, AppError> {
        let query = format!(
            "INSERT INTO {} (id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, DonationCategory>(&query)
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        db: &PgPool,
        item: &DonationCategory,
    ) -> Result<DonationCategory, AppError> {
        let query = format!(
            "UPDATE {} SET name = $2, description = $3, updated_at = $4 \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, DonationCategory>(&query)
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: DonationCategoryId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
