mod error;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::ConfigError;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    auth: Arc<AuthService>,
    system_roles: &[String],
) -> Result<Router, ConfigError> {
    session::router(auth, system_roles)
}
