use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::OnceLock;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password worker failed: {0}")]
    Worker(String),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// Hash of a random secret nobody knows, with the same parameters as real
/// hashes. Verifying against it costs as much as a genuine mismatch.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| {
        let secret = SaltString::generate(&mut OsRng);
        hash_password(secret.as_str()).unwrap_or_default()
    })
}

/// Runs [`hash_password`] on the blocking pool so request tasks keep moving.
pub async fn hash_password_async(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let pw = "S3cr3t!";
        let hash = hash_password(pw).expect("hash should succeed");
        assert_ne!(hash, pw);
        assert!(verify_password(pw, &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        assert!(matches!(
            verify_password("secret1", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn dummy_hash_is_well_formed_and_matches_nothing() {
        let hash = dummy_hash();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_password("", hash).unwrap());
        assert!(!verify_password("secret1", hash).unwrap());
        assert_eq!(dummy_hash(), hash);
    }

    #[tokio::test]
    async fn async_wrappers_agree_with_sync_versions() {
        let hash = hash_password_async("secret1".into()).await.unwrap();
        assert!(verify_password_async("secret1".into(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_async("nope".into(), hash).await.unwrap());
    }
}
