//! Cookie-level session operations and the refresh policy.

use axum::http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use super::cookie::{SessionCookie, get_cookie};
use crate::config::{COOKIE_MAX_AGE_SECS, SessionConfig};
use crate::identity::{Authority, Identity};
use crate::jwt::{Decoded, TokenCodec, TokenError, now_unix};

/// Why a request's credential could not be resolved to an identity.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no session cookie present")]
    MissingCredential,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Refusals from [`Authenticator::refresh`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Refresh denied; Max Refresh time reached")]
    MaxRefreshTimeReached,
}

impl RefreshError {
    /// Stable code for clients to branch on.
    pub fn code(&self) -> &'static str {
        match self {
            RefreshError::MaxRefreshTimeReached => "MAX_REFRESH_TIME_REACHED",
        }
    }
}

/// Session capabilities the request guards and handlers rely on.
pub trait Authenticator {
    fn cookie_name(&self) -> &str;

    /// Decode a raw cookie value. `None` means the cookie was absent.
    fn resolve(&self, cookie: Option<&str>) -> Result<Decoded, ResolveError>;

    /// Resolve the session cookie carried by a request.
    fn resolve_headers(&self, headers: &HeaderMap) -> Result<Decoded, ResolveError> {
        self.resolve(get_cookie(headers, self.cookie_name()))
    }

    /// Cookie carrying a freshly signed token for `identity`.
    fn issue_cookie(&self, identity: &Identity) -> Result<SessionCookie, TokenError>;

    /// Blank, already-expired cookie used to log a session out.
    fn cleared_cookie(&self) -> SessionCookie;

    /// New identity with a renewed expiry, or a refusal.
    fn refresh(&self, identity: &Identity) -> Result<Identity, RefreshError>;
}

/// JWT cookie sessions backed by an immutable [`SessionConfig`].
#[derive(Clone, Debug)]
pub struct AuthService {
    config: SessionConfig,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(config: SessionConfig) -> Self {
        let codec = TokenCodec::new(&config);
        Self { config, codec }
    }

    /// Build an identity issued now and expiring after the configured lifetime.
    pub fn new_identity(
        &self,
        subject: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        authorities: Vec<Authority>,
    ) -> Identity {
        let now = now_unix();
        Identity {
            expires_at: now + self.config.token_expires_in,
            issued_at: now,
            issuer: self.config.issuer.clone(),
            subject: subject.into(),
            name: name.into(),
            username: username.into(),
            authorities,
        }
    }

    /// Refresh policy evaluated at `now`.
    ///
    /// `issued_at` is preserved so the renewal window keeps counting from
    /// the original login.
    pub fn refresh_at(&self, identity: &Identity, now: i64) -> Result<Identity, RefreshError> {
        if now > identity.issued_at.saturating_add(self.config.max_renewal_time) {
            debug!(
                subject = %identity.subject,
                issued_at = identity.issued_at,
                "Refresh refused, renewal window elapsed"
            );
            return Err(RefreshError::MaxRefreshTimeReached);
        }

        Ok(Identity {
            expires_at: now + self.config.token_expires_in,
            ..identity.clone()
        })
    }

    fn cookie(&self, value: String, max_age: i64, expires_at_epoch: bool) -> SessionCookie {
        SessionCookie {
            name: self.config.cookie_name.clone(),
            value,
            path: "/",
            http_only: true,
            max_age,
            expires_at_epoch,
            secure: self.config.secure_cookies,
        }
    }
}

impl Authenticator for AuthService {
    fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    fn resolve(&self, cookie: Option<&str>) -> Result<Decoded, ResolveError> {
        let token = cookie.ok_or(ResolveError::MissingCredential)?;
        Ok(self.codec.decode(token)?)
    }

    fn issue_cookie(&self, identity: &Identity) -> Result<SessionCookie, TokenError> {
        let token = self.codec.encode(identity)?;
        Ok(self.cookie(token, COOKIE_MAX_AGE_SECS, false))
    }

    fn cleared_cookie(&self) -> SessionCookie {
        self.cookie(String::new(), 0, true)
    }

    fn refresh(&self, identity: &Identity) -> Result<Identity, RefreshError> {
        self.refresh_at(identity, now_unix())
    }
}
