//! Shared error handling for API endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::auth::RefreshError;

/// API error type with automatic response conversion.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized {
        message: String,
        code: Option<&'static str>,
    },
    Internal(String),
}

impl ApiError {
    pub fn internal(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal(context.into())
    }
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        Self::Unauthorized {
            code: Some(err.code()),
            message: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code) = match self {
            ApiError::Unauthorized { message, code } => (StatusCode::UNAUTHORIZED, message, code),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };
        (status, Json(ErrorResponse { error, code })).into_response()
    }
}
