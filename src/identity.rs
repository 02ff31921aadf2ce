//! The authenticated principal carried inside a session token.

use serde::{Deserialize, Serialize};

/// An organizational unit an authority applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// A role grant, optionally scoped to organizational units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(
        rename = "orgUnits",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub org_units: Vec<OrgUnit>,
}

impl Authority {
    /// Authority with a role and no organizational units.
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            org_units: Vec::new(),
        }
    }
}

/// Identity claims of a session token.
///
/// Field order matches the claim order written to the token payload.
/// `exp` and `iat` are always serialized; empty strings and empty
/// authority lists are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Expiry instant (Unix seconds)
    #[serde(rename = "exp", default)]
    pub expires_at: i64,
    /// Original issuance instant (Unix seconds)
    #[serde(rename = "iat", default)]
    pub issued_at: i64,
    #[serde(rename = "iss", default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,
    #[serde(rename = "sub", default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorities: Vec<Authority>,
}

impl Identity {
    /// Role names granted to this identity, in token order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.authorities.iter().map(|a| a.role.as_str())
    }

    /// True if any granted role exactly matches one of `required`.
    pub fn has_any_role(&self, required: &[String]) -> bool {
        self.roles().any(|role| required.iter().any(|r| r == role))
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
