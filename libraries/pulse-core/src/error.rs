//! Core error types for Pulse

use thiserror::Error;

/// Result type alias using `PulseError`
pub type Result<T> = std::result::Result<T, PulseError>;

/// Core error type for Pulse
#[derive(Error, Debug)]
pub enum PulseError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up, e.g. `User`
        entity: String,
        /// Identifier that matched nothing
        id: String,
    },

    /// Unique constraint violated (e.g. email already registered)
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller does not own the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A user tried to create a relation with themselves
    #[error("Self reference: {0}")]
    SelfReference(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl PulseError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for PulseError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
