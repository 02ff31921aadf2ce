//! CLI argument parsing, startup helpers and token generation.

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::error;

use crate::ServerConfig;
use crate::config::{
    ConfigError, DEFAULT_COOKIE_NAME, DEFAULT_ISSUER, DEFAULT_MAX_RENEWAL_SECS,
    DEFAULT_TOKEN_EXPIRES_IN_SECS, SessionConfig,
};
use crate::identity::{Authority, Identity};
use crate::jwt::{TokenCodec, TokenError};

/// Environment variable holding the signing key.
pub const SIGNING_KEY_ENV: &str = "SESSION_SIGNING_KEY";

const MIN_SIGNING_KEY_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sessionguard",
    about = "Stateless signed cookie sessions with role guards"
)]
pub struct Args {
    /// Log output format
    #[arg(short, long, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the session endpoints
    Serve(ServeArgs),
    /// Sign an identity payload and print the token
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "7291")]
    pub port: u16,

    /// Name of the session cookie
    #[arg(long, env = "SESSION_COOKIE_NAME", default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// Seconds an issued or refreshed token stays valid
    #[arg(long, env = "SESSION_TOKEN_EXPIRES_IN", default_value_t = DEFAULT_TOKEN_EXPIRES_IN_SECS)]
    pub token_expires_in: i64,

    /// Issuer claim for new tokens
    #[arg(long, env = "SESSION_ISSUER", default_value = DEFAULT_ISSUER)]
    pub issuer: String,

    /// Seconds after the original login during which tokens may be refreshed
    #[arg(long, env = "SESSION_MAX_RENEWAL_TIME", default_value_t = DEFAULT_MAX_RENEWAL_SECS)]
    pub max_renewal_time: i64,

    /// Set the Secure flag on session cookies (use behind HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Role admitted to /system, may be repeated
    #[arg(long = "system-role", default_value = "SYSTEM")]
    pub system_roles: Vec<String>,

    /// Path to file containing the signing key. Prefer SESSION_SIGNING_KEY instead
    #[arg(long)]
    pub signing_key_file: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Identity JSON to sign; prints an example when omitted
    #[arg(long)]
    pub payload: Option<String>,

    /// Path to file containing the signing key. Prefer SESSION_SIGNING_KEY instead
    #[arg(long)]
    pub signing_key_file: Option<String>,
}

/// Errors from the `generate` command.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unable to parse payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the signing key from environment variable or file.
/// Returns None and logs an error if the key cannot be loaded.
pub fn load_signing_key(signing_key_file: Option<&str>) -> Option<Vec<u8>> {
    let key = if let Ok(key) = std::env::var(SIGNING_KEY_ENV) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(SIGNING_KEY_ENV) };
        key
    } else if let Some(path) = signing_key_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read signing key file");
                return None;
            }
        }
    } else {
        error!(
            "Signing key is required. Set {} environment variable (recommended) or use --signing-key-file",
            SIGNING_KEY_ENV
        );
        return None;
    };

    if key.is_empty() {
        error!("Signing key is empty");
        return None;
    }

    Some(key.into_bytes())
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &ServeArgs, signing_key: Vec<u8>) -> Result<ServerConfig, ConfigError> {
    if signing_key.len() < MIN_SIGNING_KEY_LENGTH {
        error!(
            "Signing key is shorter than {} bytes. Use a longer key",
            MIN_SIGNING_KEY_LENGTH
        );
        return Err(ConfigError::SigningKeyTooShort(MIN_SIGNING_KEY_LENGTH));
    }

    let session = SessionConfig::new(signing_key)?
        .with_cookie_name(args.cookie_name.clone())?
        .with_token_expires_in(args.token_expires_in)
        .with_issuer(args.issuer.clone())
        .with_max_renewal_time(args.max_renewal_time)
        .with_secure_cookies(args.secure_cookies);

    Ok(ServerConfig {
        session,
        system_roles: args.system_roles.clone(),
    })
}

/// Sign the identity described by `payload`.
///
/// `exp` and `iat` are taken from the payload as given.
pub fn generate_token(signing_key: Vec<u8>, payload: &str) -> Result<String, GenerateError> {
    let config = SessionConfig::new(signing_key)?;
    let identity: Identity = serde_json::from_str(payload)?;
    Ok(TokenCodec::new(&config).encode(&identity)?)
}

/// Example payload printed when `generate` is run without one.
pub fn example_payload() -> String {
    let example = Identity {
        expires_at: 44444444444,
        issued_at: 1543572040,
        issuer: "anIssuer".to_string(),
        subject: "123123-21312332345-25434-sad".to_string(),
        name: "name".to_string(),
        username: "username".to_string(),
        authorities: vec![Authority::role("USER")],
    };
    serde_json::to_string(&example).unwrap_or_default()
}
