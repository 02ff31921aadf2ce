//! Guard rejection responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why a guard refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    NotAuthenticated,
    InvalidToken,
    TokenExpired,
    MissingRole { required: Vec<String> },
}

/// Uniform `401 Unauthorized` produced by every guard.
///
/// The reason is a short diagnostic; token validation details stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRejection {
    pub kind: RejectionKind,
}

impl GuardRejection {
    pub(super) fn new(kind: RejectionKind) -> Self {
        Self { kind }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn reason(&self) -> String {
        match &self.kind {
            RejectionKind::NotAuthenticated => "Not authenticated".to_string(),
            RejectionKind::InvalidToken => "Invalid token".to_string(),
            RejectionKind::TokenExpired => "Token expired".to_string(),
            RejectionKind::MissingRole { required } => format!(
                "User has none of the required roles: {}",
                required.join(", ")
            ),
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.reason(),
            }),
        )
            .into_response()
    }
}
