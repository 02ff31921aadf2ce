//! Session endpoints.
//!
//! - GET `/session` - Current identity (valid token required)
//! - POST `/session/refresh` - Renew an expired-but-intact token
//! - POST `/session/logout` - Clear the session cookie
//! - GET `/system` - Current identity, restricted to system roles

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use super::error::ApiError;
use crate::auth::{AuthService, Authenticator, CurrentIdentity, Guard};
use crate::config::ConfigError;
use crate::identity::Identity;
use crate::jwt::Validity;

pub fn router(auth: Arc<AuthService>, system_roles: &[String]) -> Result<Router, ConfigError> {
    let current: Router = Guard::require_authenticated(auth.clone())
        .protect(Router::new().route("/session", get(current_session)));

    let refresh: Router = Guard::require_authenticated_or_expired(auth.clone()).protect(
        Router::new()
            .route("/session/refresh", post(refresh_session))
            .with_state(auth.clone()),
    );

    let system: Router = Guard::require_any_role(auth.clone(), system_roles.iter().cloned())?
        .protect(Router::new().route("/system", get(current_session)));

    let logout_routes: Router = Router::new()
        .route("/session/logout", post(logout))
        .with_state(auth);

    Ok(Router::new()
        .merge(current)
        .merge(refresh)
        .merge(system)
        .merge(logout_routes))
}

async fn current_session(CurrentIdentity { identity, .. }: CurrentIdentity) -> Json<Identity> {
    Json(identity)
}

/// Exchange the presented token for one with a renewed expiry.
/// Refused once the renewal window since the original login has elapsed.
async fn refresh_session(
    State(auth): State<Arc<AuthService>>,
    CurrentIdentity { identity, validity }: CurrentIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let refreshed = auth.refresh(&identity)?;

    let cookie = auth
        .issue_cookie(&refreshed)
        .map_err(|e| ApiError::internal("Failed to sign session token", e))?
        .to_header_value()
        .map_err(|e| ApiError::internal("Failed to build session cookie", e))?;

    info!(
        subject = %refreshed.subject,
        was_expired = validity == Validity::ExpiredOnly,
        expires_at = refreshed.expires_at,
        "Session refreshed"
    );

    Ok(([(SET_COOKIE, cookie)], Json(refreshed)))
}

async fn logout(State(auth): State<Arc<AuthService>>) -> Result<impl IntoResponse, ApiError> {
    let cleared = auth
        .cleared_cookie()
        .to_header_value()
        .map_err(|e| ApiError::internal("Failed to build session cookie", e))?;

    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cleared)]))
}
