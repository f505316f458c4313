//! Models that represent accounts, authentication payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use validator::Validate;

use crate::types::AccountId;
use crate::validation::rules;

#[derive(Debug, Clone, FromRow)]
/// Database representation of an account allowed to manage site content.
pub struct Account {
    /// Unique identifier for the account.
    pub id: AccountId,
    /// Unique login identifier.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 hash of the account password. Never serialized.
    pub password_hash: String,
    /// Human-readable display name.
    pub name: String,
    /// Role describing the account's privileges.
    pub role: AccountRole,
    /// Inactive accounts can still be looked up but never authenticate.
    pub is_active: bool,
    /// Timestamp of the most recent successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported account roles stored in the database.
pub enum AccountRole {
    /// Regular member with read access to the dashboard.
    #[default]
    Member,
    /// Administrator allowed to write content and manage accounts.
    Admin,
}

impl AccountRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Member => "member",
            AccountRole::Admin => "admin",
        }
    }

    /// Only an explicit `admin` grants the admin role.
    pub fn from_requested(requested: Option<&str>) -> Self {
        match requested {
            Some(role) if role.eq_ignore_ascii_case("admin") => AccountRole::Admin,
            _ => AccountRole::Member,
        }
    }
}

impl Serialize for AccountRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "member" => Ok(AccountRole::Member),
            "admin" => Ok(AccountRole::Admin),
            // older dashboards still send "user"
            "user" | "Member" | "MEMBER" => Ok(AccountRole::Member),
            "Admin" | "ADMIN" => Ok(AccountRole::Admin),
            other => Err(serde::de::Error::unknown_variant(other, &["member", "admin"])),
        }
    }
}

impl Account {
    /// Constructs a new active account with freshly generated identifiers.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        name: String,
        role: AccountRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            username,
            email,
            password_hash,
            name,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns `true` when the account holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, AccountRole::Admin)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Payload for registering a new account.
pub struct RegisterRequest {
    #[validate(custom(function = "rules::validate_login"))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    /// Optional; anything other than `admin` yields a member account.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Credentials submitted by a client attempting to authenticate.
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Body shared by the refresh and logout endpoints.
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Public-facing representation of an account returned by the API.
pub struct AccountResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: AccountRole,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            username: account.username,
            email: account.email,
            name: account.name,
            role: account.role,
            is_active: account.is_active,
            last_login: account.last_login,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Authentication tokens returned after a successful login.
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub account: AccountResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Tokens returned after a successful refresh rotation.
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn account_role_serde_accepts_and_emits_snake_case() {
        let m: AccountRole = serde_json::from_str("\"member\"").unwrap();
        let a: AccountRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(m, AccountRole::Member);
        assert_eq!(a, AccountRole::Admin);

        let legacy: AccountRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(legacy, AccountRole::Member);

        assert_eq!(
            serde_json::to_value(AccountRole::Admin).unwrap(),
            Value::String("admin".into())
        );
        assert!(serde_json::from_str::<AccountRole>("\"root\"").is_err());
    }

    #[test]
    fn requested_role_defaults_to_member() {
        assert_eq!(AccountRole::from_requested(None), AccountRole::Member);
        assert_eq!(AccountRole::from_requested(Some("")), AccountRole::Member);
        assert_eq!(AccountRole::from_requested(Some("editor")), AccountRole::Member);
        assert_eq!(AccountRole::from_requested(Some("admin")), AccountRole::Admin);
    }

    #[test]
    fn account_response_never_contains_password_hash() {
        let account = Account::new(
            "alice".into(),
            "alice@x.com".into(),
            "$argon2id$secret-hash".into(),
            "Alice".into(),
            AccountRole::Member,
        );
        let json = serde_json::to_string(&AccountResponse::from(account)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"member\""));
    }

    #[test]
    fn register_request_validation_enforces_lengths_and_email() {
        let valid = RegisterRequest {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "secret1".into(),
            name: "Alice".into(),
            role: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: "al".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            ..valid
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
