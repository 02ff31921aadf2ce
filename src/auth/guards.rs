//! Request guards enforcing authentication and role policies.
//!
//! A [`Guard`] decides from the request headers alone. Wrapping a router
//! with [`Guard::protect`] (or layering [`enforce`] by hand) makes every
//! route behind it either run with the decoded identity in the request
//! extensions, or answer `401 Unauthorized`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::errors::{GuardRejection, RejectionKind};
use super::service::{Authenticator, ResolveError};
use crate::config::ConfigError;
use crate::jwt::{Decoded, Validity};

/// Acceptance rule applied by a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Only `Valid` tokens
    Authenticated,
    /// `Valid` or `ExpiredOnly` tokens; gates the refresh endpoint
    AuthenticatedOrExpired,
    /// `Valid` tokens granting at least one of these roles
    AnyRole(Vec<String>),
}

impl Policy {
    /// Whether a token of this validity may pass. Role checks come after.
    pub fn accepts(&self, validity: Validity) -> bool {
        match validity {
            Validity::Valid => true,
            Validity::ExpiredOnly => matches!(self, Policy::AuthenticatedOrExpired),
            Validity::Invalid => false,
        }
    }
}

/// A policy bound to the authenticator that resolves credentials.
pub struct Guard<A: ?Sized> {
    auth: Arc<A>,
    policy: Arc<Policy>,
}

impl<A: ?Sized> Clone for Guard<A> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<A: Authenticator + ?Sized> Guard<A> {
    fn new(auth: Arc<A>, policy: Policy) -> Self {
        Self {
            auth,
            policy: Arc::new(policy),
        }
    }

    pub fn require_authenticated(auth: Arc<A>) -> Self {
        Self::new(auth, Policy::Authenticated)
    }

    pub fn require_authenticated_or_expired(auth: Arc<A>) -> Self {
        Self::new(auth, Policy::AuthenticatedOrExpired)
    }

    pub fn require_any_role<I, R>(auth: Arc<A>, roles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        if roles.is_empty() {
            return Err(ConfigError::NoRequiredRoles);
        }
        Ok(Self::new(auth, Policy::AnyRole(roles)))
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Decide whether the request may proceed.
    pub fn check(&self, headers: &HeaderMap) -> Result<Decoded, GuardRejection> {
        let decoded = match self.auth.resolve_headers(headers) {
            Ok(decoded) => decoded,
            Err(ResolveError::MissingCredential) => {
                return Err(GuardRejection::new(RejectionKind::NotAuthenticated));
            }
            Err(ResolveError::Token(err)) => {
                debug!(error = %err, "Rejected session token");
                return Err(GuardRejection::new(RejectionKind::InvalidToken));
            }
        };

        if !self.policy.accepts(decoded.validity) {
            debug!(subject = %decoded.identity.subject, "Rejected expired session token");
            return Err(GuardRejection::new(RejectionKind::TokenExpired));
        }

        if let Policy::AnyRole(required) = self.policy.as_ref() {
            if !decoded.identity.has_any_role(required) {
                debug!(
                    subject = %decoded.identity.subject,
                    required = ?required,
                    "Rejected session without required role"
                );
                return Err(GuardRejection::new(RejectionKind::MissingRole {
                    required: required.clone(),
                }));
            }
        }

        Ok(decoded)
    }
}

impl<A> Guard<A>
where
    A: Authenticator + Send + Sync + ?Sized + 'static,
{
    /// Wrap every route of `router` with this guard.
    pub fn protect<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, enforce::<A>))
    }
}

/// Middleware running a guard in front of the next handler.
///
/// On success the [`Decoded`] token is inserted into the request extensions.
pub async fn enforce<A>(State(guard): State<Guard<A>>, mut request: Request, next: Next) -> Response
where
    A: Authenticator + Send + Sync + ?Sized + 'static,
{
    match guard.check(request.headers()) {
        Ok(decoded) => {
            request.extensions_mut().insert(decoded);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}
