//! Stateless cookie sessions with role-based request guards.
//!
//! The session token lives in a single HttpOnly cookie. Guards resolve it
//! on every request; nothing is stored server-side. An expired but intact
//! token may be exchanged for a fresh one until the renewal window,
//! counted from the original login, runs out.

mod cookie;
mod errors;
mod extractors;
mod guards;
mod service;

pub use cookie::{SessionCookie, get_cookie};
pub use errors::{GuardRejection, RejectionKind};
pub use extractors::CurrentIdentity;
pub use guards::{Guard, Policy, enforce};
pub use service::{AuthService, Authenticator, RefreshError, ResolveError};
