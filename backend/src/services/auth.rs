//! Registration, login, refresh rotation and logout.
//!
//! Refresh tokens are single use: a successful refresh revokes the consumed
//! session and issues a replacement that carries the original client
//! metadata forward. Session expiry is detected lazily when a token is used.

use chrono::Utc;
use std::sync::Arc;

use crate::models::session::{ClientMeta, Session};
use crate::models::user::{
    Account, AccountRole, LoginRequest, LoginResponse, RefreshTokenResponse, RegisterRequest,
};
use crate::repositories::{AccountStore, SessionStore, StorageError};
use crate::types::AccountId;
use crate::utils::jwt::{hash_refresh_token, TokenCodec, TokenError, TOKEN_TYPE};
use crate::utils::password::{dummy_hash, hash_password_async, verify_password_async};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login identifier already registered")]
    DuplicateLogin,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    InactiveAccount,
    #[error("refresh token not recognised")]
    InvalidRefreshToken,
    #[error("refresh token expired or revoked")]
    RefreshTokenExpiredOrRevoked,
    #[error("account not found")]
    AccountNotFound,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

struct IssuedTokens {
    access_token: String,
    refresh_token: String,
    session: Session,
}

pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            accounts,
            sessions,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AuthError> {
        if self.accounts.exists_by_login(&request.username).await? {
            return Err(AuthError::DuplicateLogin);
        }
        if self.accounts.exists_by_email(&request.email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password_async(request.password)
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        let role = AccountRole::from_requested(request.role.as_deref());
        let account = Account::new(
            request.username,
            request.email,
            password_hash,
            request.name,
            role,
        );

        // A concurrent registration can still win the unique index.
        let created = self.accounts.create(&account).await.map_err(|err| match err {
            err if err.violates("email") => AuthError::DuplicateEmail,
            StorageError::UniqueViolation { .. } => AuthError::DuplicateLogin,
            other => AuthError::Storage(other),
        })?;

        tracing::info!(
            account_id = %created.id,
            login = %created.username,
            role = created.role.as_str(),
            "account registered"
        );
        Ok(created)
    }

    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientMeta,
    ) -> Result<LoginResponse, AuthError> {
        let Some(account) = self.accounts.find_by_login(&request.username).await? else {
            // Unknown logins pay for one Argon2 verification like a wrong password does.
            let _ = verify_password_async(request.password, dummy_hash().to_owned()).await;
            return Err(AuthError::InvalidCredentials);
        };

        let verified = verify_password_async(request.password, account.password_hash.clone())
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        if !verified {
            tracing::debug!(login = %account.username, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        // Checked only after the password so inactivity never leaks existence.
        if !account.is_active {
            return Err(AuthError::InactiveAccount);
        }

        let issued = self.mint(&account, client)?;
        self.sessions.create(&issued.session).await?;

        if let Err(err) = self.accounts.stamp_last_login(account.id).await {
            tracing::warn!(account_id = %account.id, error = %err, "failed to stamp last login");
        }

        tracing::info!(
            account_id = %account.id,
            session_id = %issued.session.id,
            "login succeeded"
        );
        Ok(LoginResponse {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.tokens.access_ttl_seconds(),
            account: account.into(),
        })
    }

    pub async fn refresh_token(&self, token: &str) -> Result<RefreshTokenResponse, AuthError> {
        let session = self
            .sessions
            .find_by_token(token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if !session.is_valid_at(Utc::now()) {
            tracing::debug!(session_id = %session.id, "refresh with spent session");
            return Err(AuthError::RefreshTokenExpiredOrRevoked);
        }

        let account = self
            .accounts
            .find_by_id(session.account_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if !account.is_active {
            return Err(AuthError::InactiveAccount);
        }

        let issued = self.mint(&account, session.client_meta())?;

        // A concurrent refresh that already consumed the token wins. A storage
        // failure must not strand the caller without new tokens.
        match self.sessions.revoke(token).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(session_id = %session.id, "refresh lost the rotation race");
                return Err(AuthError::RefreshTokenExpiredOrRevoked);
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %err,
                    "failed to revoke consumed session"
                );
            }
        }
        self.sessions.create(&issued.session).await?;

        tracing::info!(
            account_id = %account.id,
            consumed_session_id = %session.id,
            session_id = %issued.session.id,
            "refresh token rotated"
        );
        Ok(RefreshTokenResponse {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }

    pub async fn get_current_account(&self, account_id: AccountId) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Unknown and already revoked tokens are accepted silently.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.revoke(token).await?;
        Ok(())
    }

    pub async fn logout_all(&self, account_id: AccountId) -> Result<u64, AuthError> {
        let revoked = self.sessions.revoke_all(account_id).await?;
        tracing::info!(account_id = %account_id, revoked, "all sessions revoked");
        Ok(revoked)
    }

    pub async fn sessions_for(&self, account_id: AccountId) -> Result<Vec<Session>, AuthError> {
        Ok(self.sessions.find_by_account(account_id).await?)
    }

    fn mint(&self, account: &Account, client: ClientMeta) -> Result<IssuedTokens, AuthError> {
        let access_token =
            self.tokens
                .issue_access(account.id, &account.username, account.role)?;
        let refresh_token = self.tokens.issue_refresh();
        let session = Session::new(
            hash_refresh_token(&refresh_token),
            account.id,
            self.tokens.refresh_expiry_from(Utc::now()),
            client,
        );
        Ok(IssuedTokens {
            access_token,
            refresh_token,
            session,
        })
    }
}
