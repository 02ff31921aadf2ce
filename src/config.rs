//! Session configuration, constructed once at startup and shared read-only.

use std::fmt;

use thiserror::Error;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "JWT";

/// Default token lifetime: 5 minutes
pub const DEFAULT_TOKEN_EXPIRES_IN_SECS: i64 = 5 * 60;

/// Default issuer claim.
pub const DEFAULT_ISSUER: &str = "AuthServer";

/// Default renewal window, measured from the original `iat`: 30 days
pub const DEFAULT_MAX_RENEWAL_SECS: i64 = 30 * 24 * 60 * 60;

/// Lifetime of the issued session cookie itself: 30 days
pub const COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Errors raised while building session or guard configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing key must not be empty")]
    EmptySigningKey,
    #[error("signing key must be at least {0} bytes")]
    SigningKeyTooShort(usize),
    #[error("cookie name must not be empty")]
    EmptyCookieName,
    #[error("a role guard needs at least one required role")]
    NoRequiredRoles,
}

/// Immutable settings for issuing and validating session tokens.
#[derive(Clone)]
pub struct SessionConfig {
    signing_key: Vec<u8>,
    /// Name of the cookie carrying the token
    pub cookie_name: String,
    /// Seconds a freshly issued or refreshed token stays valid
    pub token_expires_in: i64,
    /// Issuer stamped on new identities
    pub issuer: String,
    /// Seconds after the original `iat` during which refresh is allowed
    pub max_renewal_time: i64,
    /// Whether to set the Secure flag on session cookies
    pub secure_cookies: bool,
}

impl SessionConfig {
    /// Create a configuration with the default settings and the given key.
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let signing_key = signing_key.into();
        if signing_key.is_empty() {
            return Err(ConfigError::EmptySigningKey);
        }
        Ok(Self {
            signing_key,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            token_expires_in: DEFAULT_TOKEN_EXPIRES_IN_SECS,
            issuer: DEFAULT_ISSUER.to_string(),
            max_renewal_time: DEFAULT_MAX_RENEWAL_SECS,
            secure_cookies: false,
        })
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyCookieName);
        }
        self.cookie_name = name;
        Ok(self)
    }

    pub fn with_token_expires_in(mut self, seconds: i64) -> Self {
        self.token_expires_in = seconds;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_max_renewal_time(mut self, seconds: i64) -> Self {
        self.max_renewal_time = seconds;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_key", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("token_expires_in", &self.token_expires_in)
            .field("issuer", &self.issuer)
            .field("max_renewal_time", &self.max_renewal_time)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}
