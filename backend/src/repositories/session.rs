//! Refresh-token session store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::session::Session;
use crate::repositories::error::StorageError;
use crate::types::AccountId;
use crate::utils::jwt::hash_refresh_token;

const TABLE_NAME: &str = "sessions";
const SELECT_COLUMNS: &str = "id, token_hash, account_id, expires_at, is_revoked, revoked_at, \
                              user_agent, ip_address, created_at";

/// Tokens are looked up by their raw string; implementations compare the
/// digest stored in `Session::token_hash`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, StorageError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StorageError>;
    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, StorageError>;
    /// Returns `true` only for the call that flipped the session to revoked.
    /// Unknown or already revoked tokens yield `Ok(false)`.
    async fn revoke(&self, token: &str) -> Result<bool, StorageError>;
    /// Returns the number of sessions flipped to revoked.
    async fn revoke_all(&self, account_id: AccountId) -> Result<u64, StorageError>;
    /// Returns the number of expired rows removed.
    async fn delete_expired(&self) -> Result<u64, StorageError>;
}

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> Result<Session, StorageError> {
        let query = format!(
            "INSERT INTO {} (id, token_hash, account_id, expires_at, is_revoked, revoked_at, \
             user_agent, ip_address, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Session>(&query)
            .bind(session.id)
            .bind(&session.token_hash)
            .bind(session.account_id)
            .bind(session.expires_at)
            .bind(session.is_revoked)
            .bind(session.revoked_at)
            .bind(&session.user_agent)
            .bind(&session.ip_address)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StorageError> {
        let query = format!(
            "SELECT {} FROM {} WHERE token_hash = $1",
            SELECT_COLUMNS, TABLE_NAME
        );
        let row = sqlx::query_as::<_, Session>(&query)
            .bind(hash_refresh_token(token))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, StorageError> {
        let query = format!(
            "SELECT {} FROM {} WHERE account_id = $1 ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS, TABLE_NAME
        );
        let rows = sqlx::query_as::<_, Session>(&query)
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn revoke(&self, token: &str) -> Result<bool, StorageError> {
        let query = format!(
            "UPDATE {} SET is_revoked = TRUE, revoked_at = $2 \
             WHERE token_hash = $1 AND is_revoked = FALSE",
            TABLE_NAME
        );
        let result = sqlx::query(&query)
            .bind(hash_refresh_token(token))
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(&self, account_id: AccountId) -> Result<u64, StorageError> {
        let query = format!(
            "UPDATE {} SET is_revoked = TRUE, revoked_at = $2 \
             WHERE account_id = $1 AND is_revoked = FALSE",
            TABLE_NAME
        );
        let result = sqlx::query(&query)
            .bind(account_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let query = format!("DELETE FROM {} WHERE expires_at <= $1", TABLE_NAME);
        let result = sqlx::query(&query)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
