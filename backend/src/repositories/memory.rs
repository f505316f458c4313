//! In-process store implementations used by tests and local experiments.
//!
//! Semantics mirror the Postgres stores, including unique indexes on
//! login/email/token digest and soft-delete visibility.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::session::Session;
use crate::models::user::Account;
use crate::repositories::account::AccountStore;
use crate::repositories::error::StorageError;
use crate::repositories::session::SessionStore;
use crate::types::{AccountId, SessionId};
use crate::utils::jwt::hash_refresh_token;

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_live(&self, predicate: impl Fn(&Account) -> bool) -> Option<Account> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .values()
            .find(|a| a.deleted_at.is_none() && predicate(a))
            .cloned()
    }

    fn any(&self, predicate: impl Fn(&Account) -> bool) -> bool {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts.values().any(predicate)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: &Account) -> Result<Account, StorageError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.values().any(|a| a.username == account.username) {
            return Err(StorageError::unique("accounts_username_key"));
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StorageError::unique("accounts_email_key"));
        }
        accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Account>, StorageError> {
        Ok(self.find_live(|a| a.username == login))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        Ok(self.find_live(|a| a.email == email))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.find_live(|a| a.id == id))
    }

    async fn exists_by_login(&self, login: &str) -> Result<bool, StorageError> {
        Ok(self.any(|a| a.username == login))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StorageError> {
        Ok(self.any(|a| a.email == email))
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, StorageError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        let conflict = accounts.values().find(|a| {
            a.id != account.id && (a.username == account.username || a.email == account.email)
        });
        if let Some(other) = conflict {
            let constraint = if other.username == account.username {
                "accounts_username_key"
            } else {
                "accounts_email_key"
            };
            return Err(StorageError::unique(constraint));
        }
        let Some(stored) = accounts.get_mut(&account.id) else {
            return Ok(None);
        };
        *stored = Account {
            updated_at: Utc::now(),
            ..account.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn stamp_last_login(&self, id: AccountId) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(account) = accounts.get_mut(&id) {
            account.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> Result<Session, StorageError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions
            .values()
            .any(|s| s.token_hash == session.token_hash)
        {
            return Err(StorageError::unique("sessions_token_hash_key"));
        }
        sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StorageError> {
        let digest = hash_refresh_token(token);
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sessions.values().find(|s| s.token_hash == digest).cloned())
    }

    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, StorageError> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn revoke(&self, token: &str) -> Result<bool, StorageError> {
        let digest = hash_refresh_token(token);
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let Some(session) = sessions
            .values_mut()
            .find(|s| s.token_hash == digest && !s.is_revoked)
        else {
            return Ok(false);
        };
        session.is_revoked = true;
        session.revoked_at = Some(Utc::now());
        Ok(true)
    }

    async fn revoke_all(&self, account_id: AccountId) -> Result<u64, StorageError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut revoked = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.account_id == account_id && !s.is_revoked)
        {
            session.is_revoked = true;
            session.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
