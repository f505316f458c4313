//! Account (credential) store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::Account;
use crate::repositories::error::StorageError;
use crate::types::AccountId;

const TABLE_NAME: &str = "accounts";
const SELECT_COLUMNS: &str = "id, username, email, password_hash, name, role, is_active, \
                              last_login, created_at, updated_at, deleted_at";

/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// storage failures. Lookups by login/email/id see live accounts only, while
/// the existence checks include soft-deleted rows so identifiers are never
/// reused.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: &Account) -> Result<Account, StorageError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<Account>, StorageError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StorageError>;
    async fn exists_by_login(&self, login: &str) -> Result<bool, StorageError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, StorageError>;
    /// Returns `Ok(None)` when no row carries `account.id`.
    async fn update(&self, account: &Account) -> Result<Option<Account>, StorageError>;
    async fn stamp_last_login(&self, id: AccountId) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_live_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Account>, StorageError> {
        let query = format!(
            "SELECT {} FROM {} WHERE {} = $1 AND deleted_at IS NULL",
            SELECT_COLUMNS, TABLE_NAME, column
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by(&self, column: &'static str, value: &str) -> Result<bool, StorageError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)",
            TABLE_NAME, column
        );
        let exists = sqlx::query_scalar::<_, bool>(&query)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: &Account) -> Result<Account, StorageError> {
        let query = format!(
            "INSERT INTO {} (id, username, email, password_hash, name, role, is_active, \
             last_login, created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.name)
            .bind(account.role)
            .bind(account.is_active)
            .bind(account.last_login)
            .bind(account.created_at)
            .bind(account.updated_at)
            .bind(account.deleted_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Account>, StorageError> {
        self.find_live_by("username", login).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        self.find_live_by("email", email).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StorageError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND deleted_at IS NULL",
            SELECT_COLUMNS, TABLE_NAME
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by_login(&self, login: &str) -> Result<bool, StorageError> {
        self.exists_by("username", login).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StorageError> {
        self.exists_by("email", email).await
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, StorageError> {
        let query = format!(
            "UPDATE {} SET username = $2, email = $3, password_hash = $4, name = $5, role = $6, \
             is_active = $7, deleted_at = $8, updated_at = $9 WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.name)
            .bind(account.role)
            .bind(account.is_active)
            .bind(account.deleted_at)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn stamp_last_login(&self, id: AccountId) -> Result<(), StorageError> {
        let query = format!("UPDATE {} SET last_login = $2 WHERE id = $1", TABLE_NAME);
        sqlx::query(&query)
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
