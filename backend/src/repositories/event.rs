//! Event repository.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::event::Event;
use crate::repositories::common::LiveTable;
use crate::repositories::repository::Repository;
use crate::types::EventId;

const TABLE_NAME: &str = "events";
const SELECT_COLUMNS: &str =
    "id, title, description, date, location, image_url, created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "date DESC",
    entity: "Event",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct EventRepository;

impl EventRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Repository<Event> for EventRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = EventId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(&self, db: &PgPool, id: EventId) -> Result<Event, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(&self, db: &PgPool, item: &Event) -> Result<Event, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, description, date, location, image_url, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Event>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.date)
            .bind(&item.location)
            .bind(&item.image_url)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Event) -> Result<Event, AppError> {
        let query = format!(
            "UPDATE {} SET title = $2, description = $3, date = $4, location = $5, \
             image_url = $6, updated_at = $7 WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.date)
            .bind(&item.location)
            .bind(&item.image_url)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: EventId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}
