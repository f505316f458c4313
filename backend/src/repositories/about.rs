//! About page repository. The table holds at most one live row.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::about::About;

const TABLE_NAME: &str = "about";
const SELECT_COLUMNS: &str = "id, title, content, vision, mission, image_url, created_at, \
                              updated_at, deleted_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct AboutRepository;

impl AboutRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_current(&self, db: &PgPool) -> Result<Option<About>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE deleted_at IS NULL ORDER BY created_at ASC LIMIT 1",
            SELECT_COLUMNS, TABLE_NAME
        );
        let row = sqlx::query_as::<_, About>(&query)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn insert(&self, db: &PgPool, item: &About) -> Result<About, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, content, vision, mission, image_url, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, About>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.content)
            .bind(&item.vision)
            .bind(&item.mission)
            .bind(&item.image_url)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool, item: &About) -> Result<About, AppError> {
        let query = format!(
            "UPDATE {} SET title = $2, content = $3, vision = $4, mission = $5, image_url = $6, \
             updated_at = $7 WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, About>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.content)
            .bind(&item.vision)
            .bind(&item.mission)
            .bind(&item.image_url)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("About content not found".into()))
    }
}
