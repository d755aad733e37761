/// Server error types
use crate::api::response::Envelope;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pulse_core::PulseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Self reference: {0}")]
    SelfReference(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(PulseError),

    #[error("Media host error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl ServerError {
    /// HTTP status this error is answered with
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Conflict(_) | ServerError::SelfReference(_) => StatusCode::CONFLICT,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::InvalidToken(_) | ServerError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ServerError::Internal(_)
            | ServerError::Database(_)
            | ServerError::Media(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Bcrypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PulseError> for ServerError {
    fn from(err: PulseError) -> Self {
        match err {
            PulseError::NotFound { entity, .. } => {
                ServerError::NotFound(format!("{entity} not found"))
            }
            PulseError::Duplicate(msg) => ServerError::Conflict(msg),
            PulseError::InvalidInput(msg) => ServerError::Validation(msg),
            PulseError::PermissionDenied(msg) => ServerError::Forbidden(msg),
            PulseError::SelfReference(msg) => ServerError::SelfReference(msg),
            other => ServerError::Database(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ServerError::Validation(msg)
            | ServerError::Conflict(msg)
            | ServerError::NotFound(msg)
            | ServerError::Forbidden(msg)
            | ServerError::SelfReference(msg)
            | ServerError::InvalidToken(msg) => msg,
            ServerError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            ServerError::Media(ref msg) => {
                tracing::error!("Media host error: {}", msg);
                "Media upload failed".to_string()
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                "Configuration error".to_string()
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                "IO error".to_string()
            }
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                "Invalid token".to_string()
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                "Password error".to_string()
            }
        };

        Envelope::error(status, message).into_response()
    }
}
