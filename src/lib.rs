pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod identity;
pub mod jwt;

use api::create_api_router;
use auth::AuthService;
use axum::Router;
use config::{ConfigError, SessionConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Token signing and cookie settings
    pub session: SessionConfig,
    /// Roles admitted to the system endpoint
    pub system_roles: Vec<String>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: ServerConfig) -> Result<Router, ConfigError> {
    let auth = Arc::new(AuthService::new(config.session));
    create_api_router(auth, &config.system_roles)
}

/// Serve the application on the given listener until the server exits.
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}
