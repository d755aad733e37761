/// Storage-specific errors
use pulse_core::PulseError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// A stored JSON column or timestamp could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<StorageError> for PulseError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => PulseError::not_found(entity, id),
            StorageError::Duplicate(msg) => PulseError::Duplicate(msg),
            StorageError::Database(e) => PulseError::Database(e.to_string()),
            other => PulseError::storage(other.to_string()),
        }
    }
}
