//! Storage-level failures shared by the auth stores.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A unique index rejected the write; carries the constraint name when known.
    #[error("unique constraint violated: {}", constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StorageError {
    pub fn unique(constraint: impl Into<String>) -> Self {
        StorageError::UniqueViolation {
            constraint: Some(constraint.into()),
        }
    }

    /// True when the violated constraint name mentions `column`.
    pub fn violates(&self, column: &str) -> bool {
        matches!(
            self,
            StorageError::UniqueViolation { constraint: Some(name) } if name.contains(column)
        )
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StorageError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                };
            }
        }
        StorageError::Database(err)
    }
}
