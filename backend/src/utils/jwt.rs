use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::config::Config;
use crate::models::user::AccountRole;
use crate::types::AccountId;

pub const TOKEN_ISSUER: &str = "sitecms-backend";
pub const TOKEN_TYPE: &str = "Bearer";
const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: AccountId,
    pub username: String,
    pub role: AccountRole,
    pub iss: String,
    pub sub: String, // login identifier
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    fn new(
        account_id: AccountId,
        username: String,
        role: AccountRole,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            account_id,
            sub: username.clone(),
            username,
            role,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiry(now, ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, AccountRole::Admin)
    }
}

/// Upper bound for either token lifetime.
pub const MAX_TOKEN_TTL: std::time::Duration =
    std::time::Duration::from_secs(366 * 24 * 60 * 60);

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies access tokens and mints opaque refresh tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(
        secret: &str,
        access_ttl: std::time::Duration,
        refresh_ttl: std::time::Duration,
    ) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("token signing secret must not be empty");
        }
        for (name, ttl) in [("access", access_ttl), ("refresh", refresh_ttl)] {
            if ttl > MAX_TOKEN_TTL {
                anyhow::bail!(
                    "{} token TTL of {}s exceeds the {}s maximum",
                    name,
                    ttl.as_secs(),
                    MAX_TOKEN_TTL.as_secs()
                );
            }
        }
        let access_ttl = Duration::from_std(access_ttl)
            .map_err(|e| anyhow::anyhow!("Invalid access token TTL: {}", e))?;
        let refresh_ttl = Duration::from_std(refresh_ttl)
            .map_err(|e| anyhow::anyhow!("Invalid refresh token TTL: {}", e))?;

        // Pinning the algorithm list rejects RS*/ES* and unsigned headers.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    pub fn issue_access(
        &self,
        account_id: AccountId,
        username: &str,
        role: AccountRole,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(
            account_id,
            username.to_string(),
            role,
            Utc::now(),
            self.access_ttl,
        );
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Returns a URL-safe random token; meaningless without its session row.
    pub fn issue_refresh(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// `expires_in` value for token responses.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        expiry(now, self.refresh_ttl)
    }
}

/// Digest stored in place of the raw refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            "secret",
            std::time::Duration::from_secs(15 * 60),
            std::time::Duration::from_secs(7 * 24 * 3600),
        )
        .expect("codec")
    }

    #[test]
    fn oversized_ttls_are_rejected() {
        let huge = std::time::Duration::from_secs(100_000_000 * 24 * 3600);
        let minute = std::time::Duration::from_secs(60);
        assert!(TokenCodec::new("secret", minute, huge).is_err());
        assert!(TokenCodec::new("secret", huge, minute).is_err());
        assert!(TokenCodec::new("secret", minute, MAX_TOKEN_TTL).is_ok());
    }

    #[test]
    fn expiry_saturates_instead_of_overflowing() {
        let codec = TokenCodec::new(
            "secret",
            std::time::Duration::from_secs(60),
            MAX_TOKEN_TTL,
        )
        .expect("codec");
        let far = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(codec.refresh_expiry_from(far), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn issue_and_verify_carries_claims() {
        let codec = codec();
        let account_id = AccountId::new();
        let token = codec
            .issue_access(account_id, "bob", AccountRole::Admin)
            .expect("issue token");
        let claims = codec.verify_access(&token).expect("verify token");
        assert_eq!(claims.account_id, account_id);
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.sub, "bob");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.role, AccountRole::Admin);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_tokens_are_unique_and_url_safe() {
        let codec = codec();
        let a = codec.issue_refresh();
        let b = codec.issue_refresh();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn refresh_digest_is_stable_hex() {
        let digest = hash_refresh_token("abc");
        assert_eq!(digest, hash_refresh_token("abc"));
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, hash_refresh_token("abd"));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(TokenCodec::new(
            "",
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(1)
        )
        .is_err());
    }

    #[test]
    fn access_ttl_seconds_reports_configured_value() {
        assert_eq!(codec().access_ttl_seconds(), 900);
    }
}
