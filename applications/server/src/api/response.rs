//! Uniform response envelope
//!
//! Every answer, success or failure, is `{statusCode, success, message}` or
//! `{statusCode, success, data}`. The transport status always equals
//! `statusCode`.

use crate::error::ServerError;
use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = ()> {
    pub status_code: u16,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful answer carrying a payload
    pub fn data(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// 200 with a payload
    pub fn ok(data: T) -> Self {
        Self::data(StatusCode::OK, data)
    }
}

impl Envelope {
    /// Successful answer carrying only a message
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Failed answer
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// JSON body extractor whose rejections are rendered as a 400 envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);
