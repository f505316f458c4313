//! Repository trait shared by the content modules.
//!
//! Every content table carries a `deleted_at` marker: deletes flip it and
//! every read filters it.

use crate::error::AppError;
use sqlx::PgPool;

/// Standard repository trait for content tables.
#[allow(async_fn_in_trait)]
pub trait Repository<T> {
    /// Target table name.
    const TABLE: &'static str;
    /// Primary key type for the record.
    type Id;

    /// One page of live records plus the live total.
    async fn find_page(&self, db: &PgPool, limit: i64, offset: i64)
        -> Result<(Vec<T>, i64), AppError>;

    /// Find a single live record by ID.
    async fn find_by_id(&self, db: &PgPool, id: Self::Id) -> Result<T, AppError>;

    /// Create a new record
    async fn create(&self, db: &PgPool, item: &T) -> Result<T, AppError>;

    /// Update an existing live record
    async fn update(&self, db: &PgPool, item: &T) -> Result<T, AppError>;

    /// Soft-delete a record by ID.
    async fn delete(&self, db: &PgPool, id: Self::Id) -> Result<(), AppError>;
}
