use rusqlite::ErrorCode;

/// Failures from the model layer that callers need to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input rejected before anything touched the database
    #[error("validation failed: {0}")]
    Validation(String),

    /// A NOT NULL, UNIQUE or FOREIGN KEY constraint rejected the write
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ModelError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, ref msg)
                if e.code == ErrorCode::ConstraintViolation =>
            {
                ModelError::Integrity(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            other => ModelError::Storage(other.into()),
        }
    }
}

impl From<r2d2::Error> for ModelError {
    fn from(err: r2d2::Error) -> Self {
        ModelError::Storage(anyhow::Error::new(err).context("Failed to get database connection"))
    }
}

impl ModelError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, ModelError::Integrity(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation(_))
    }
}
