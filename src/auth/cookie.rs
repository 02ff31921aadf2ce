//! Session cookie parsing and formatting.

use std::fmt;

use axum::http::{HeaderMap, HeaderValue, header, header::InvalidHeaderValue};

/// Extract a cookie value from the Cookie header.
///
/// A cookie sent with an empty value is still present.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Descriptor of a session cookie to send in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: &'static str,
    pub http_only: bool,
    /// Seconds until the browser drops the cookie; 0 deletes it
    pub max_age: i64,
    /// Adds `Expires` at the Unix epoch, used when clearing
    pub expires_at_epoch: bool,
    pub secure: bool,
}

impl SessionCookie {
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        write!(f, "; Max-Age={}", self.max_age)?;
        if self.expires_at_epoch {
            f.write_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}
