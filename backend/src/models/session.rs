//! Refresh-token session records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{AccountId, SessionId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Client details captured when a session is issued.
pub struct ClientMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
/// Database representation of an issued refresh token.
///
/// Rows are append-only apart from the revocation flag. The raw token is never
/// stored; `token_hash` holds its SHA-256 digest.
pub struct Session {
    pub id: SessionId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        token_hash: String,
        account_id: AccountId,
        expires_at: DateTime<Utc>,
        client: ClientMeta,
    ) -> Self {
        Self {
            id: SessionId::new(),
            token_hash,
            account_id,
            expires_at,
            is_revoked: false,
            revoked_at: None,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A session may mint tokens iff it is neither revoked nor expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn client_meta(&self) -> ClientMeta {
        ClientMeta {
            user_agent: self.user_agent.clone(),
            ip_address: self.ip_address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration) -> Session {
        Session::new(
            "digest".into(),
            AccountId::new(),
            Utc::now() + expires_in,
            ClientMeta::default(),
        )
    }

    #[test]
    fn fresh_session_is_valid() {
        assert!(session(Duration::minutes(5)).is_valid());
    }

    #[test]
    fn expiry_is_exclusive_at_the_boundary() {
        let s = session(Duration::minutes(5));
        assert!(s.is_valid_at(s.expires_at - Duration::seconds(1)));
        assert!(!s.is_valid_at(s.expires_at));
    }

    #[test]
    fn revoked_session_is_invalid_even_before_expiry() {
        let mut s = session(Duration::days(1));
        s.is_revoked = true;
        s.revoked_at = Some(Utc::now());
        assert!(!s.is_valid());
    }

    #[test]
    fn client_meta_is_carried_forward() {
        let meta = ClientMeta {
            user_agent: Some("curl/8".into()),
            ip_address: Some("10.0.0.7".into()),
        };
        let s = Session::new("d".into(), AccountId::new(), Utc::now(), meta.clone());
        assert_eq!(s.client_meta(), meta);
    }
}
