//! Axum extractors for guarded handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::{GuardRejection, RejectionKind};
use crate::identity::Identity;
use crate::jwt::{Decoded, Validity};

/// Identity admitted by a guard earlier in the middleware stack.
///
/// Rejects with `401` when no guard ran, so handlers mounted outside a
/// guard fail closed.
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub identity: Identity,
    pub validity: Validity,
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let decoded = parts
            .extensions
            .get::<Decoded>()
            .cloned()
            .ok_or(GuardRejection::new(RejectionKind::NotAuthenticated))?;

        Ok(CurrentIdentity {
            identity: decoded.identity,
            validity: decoded.validity,
        })
    }
}
