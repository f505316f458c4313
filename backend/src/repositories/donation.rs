//! Donation repository and the public summary aggregate.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::donation::{CategoryTotal, Donation, DonationSummary, PaymentStatus};
use crate::repositories::common::{push_clause, LiveTable};
use crate::repositories::repository::Repository;
use crate::types::DonationId;

const TABLE_NAME: &str = "donations";
const SELECT_COLUMNS: &str = "id, donor_name, amount, category_id, payment_status, message, \
                              created_at, updated_at, deleted_at";

const LIVE: LiveTable = LiveTable {
    table: TABLE_NAME,
    columns: SELECT_COLUMNS,
    order_by: "created_at DESC",
    entity: "Donation",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DonationRepository;

impl DonationRepository {
    pub fn new() -> Self {
        Self
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, status: Option<PaymentStatus>) {
        let mut has_clause = false;
        push_clause(builder, &mut has_clause);
        builder.push("deleted_at IS NULL");
        if let Some(status) = status {
            push_clause(builder, &mut has_clause);
            builder.push("payment_status = ").push_bind(status.as_str());
        }
    }

    pub async fn find_page_by_status(
        &self,
        db: &PgPool,
        status: Option<PaymentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Donation>, i64), AppError> {
        let mut count_builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", TABLE_NAME));
        Self::push_filters(&mut count_builder, status);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await?;

        let mut builder =
            QueryBuilder::new(format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE_NAME));
        Self::push_filters(&mut builder, status);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder.build_query_as::<Donation>().fetch_all(db).await?;
        Ok((rows, total))
    }

    /// Totals over successful, live donations grouped by live category.
    pub async fn summary(&self, db: &PgPool) -> Result<DonationSummary, AppError> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT c.id AS category_id,
                   c.name AS category_name,
                   COALESCE(SUM(d.amount), 0) AS total_amount,
                   COUNT(d.id) AS total_transactions
            FROM donation_categories c
            JOIN donations d
              ON d.category_id = c.id
             AND d.deleted_at IS NULL
             AND d.payment_status = 'success'
            WHERE c.deleted_at IS NULL
            GROUP BY c.id, c.name
            ORDER BY total_amount DESC, c.name ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(DonationSummary::from_categories(rows))
    }
}

impl Repository<Donation> for DonationRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = DonationId;

    async fn find_page(
        &self,
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Donation>, i64), AppError> {
        LIVE.fetch_page(db, None, limit, offset).await
    }

    async fn find_by_id(&self, db: &PgPool, id: DonationId) -> Result<Donation, AppError> {
        LIVE.fetch_one(db, *id.as_uuid(), None).await
    }

    async fn create(&self, db: &PgPool, item: &Donation) -> Result<Donation, AppError> {
        let query = format!(
            "INSERT INTO {} (id, donor_name, amount, category_id, payment_status, message, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Donation>(&query)
            .bind(item.id)
            .bind(&item.donor_name)
            .bind(item.amount)
            .bind(item.category_id)
            .bind(item.payment_status)
            .bind(&item.message)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Donation) -> Result<Donation, AppError> {
        let query = format!(
            "UPDATE {} SET donor_name = $2, amount = $3, category_id = $4, payment_status = $5, \
             message = $6, updated_at = $7 WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(item.id)
            .bind(&item.donor_name)
            .bind(item.amount)
            .bind(item.category_id)
            .bind(item.payment_status)
            .bind(&item.message)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| LIVE.not_found())
    }

    async fn delete(&self, db: &PgPool, id: DonationId) -> Result<(), AppError> {
        LIVE.soft_delete(db, *id.as_uuid()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_is_bound_after_live_filter() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM donations");
        DonationRepository::push_filters(&mut builder, Some(PaymentStatus::Success));
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM donations WHERE deleted_at IS NULL AND payment_status = $1"
        );
    }

    #[test]
    fn no_status_filter_only_hides_deleted() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM donations");
        DonationRepository::push_filters(&mut builder, None);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM donations WHERE deleted_at IS NULL"
        );
    }
}
