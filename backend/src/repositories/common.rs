//! Shared repository utilities.

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Describes how a content table is read.
#[derive(Debug, Clone, Copy)]
pub struct LiveTable {
    pub table: &'static str,
    pub columns: &'static str,
    pub order_by: &'static str,
    /// Human-readable entity name used in not-found messages.
    pub entity: &'static str,
}

impl LiveTable {
    pub fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.entity))
    }

    fn live_filter(&self, extra: Option<&str>) -> String {
        match extra {
            Some(extra) => format!("WHERE deleted_at IS NULL AND {}", extra),
            None => "WHERE deleted_at IS NULL".to_string(),
        }
    }

    /// Counts and pages live rows, optionally narrowed by a static predicate.
    pub async fn fetch_page<T>(
        &self,
        db: &PgPool,
        extra: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<T>, i64), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let filter = self.live_filter(extra);
        let count_query = format!("SELECT COUNT(*) FROM {} {}", self.table, filter);
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .fetch_one(db)
            .await?;

        let query = format!(
            "SELECT {} FROM {} {} ORDER BY {} LIMIT $1 OFFSET $2",
            self.columns, self.table, filter, self.order_by
        );
        let rows = sqlx::query_as::<_, T>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?;
        Ok((rows, total))
    }

    pub async fn fetch_one<T>(&self, db: &PgPool, id: Uuid, extra: Option<&str>) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let query = format!(
            "SELECT {} FROM {} {} AND id = $1",
            self.columns,
            self.table,
            self.live_filter(extra)
        );
        sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| self.not_found())
    }

    pub async fn soft_delete(&self, db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let query = format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
            self.table
        );
        let result = sqlx::query(&query).bind(id).execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(self.not_found());
        }
        Ok(())
    }
}
