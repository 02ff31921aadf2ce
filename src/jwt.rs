//! Session token encoding and validation.
//!
//! Tokens are HMAC-signed JWTs whose payload is an [`Identity`]. Decoding
//! classifies a token as valid, expired-but-intact, or invalid; only the
//! first two produce an identity.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::identity::{Authority, Identity};

/// Algorithm used to sign new tokens.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Three-way outcome of decoding a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Signature, structure and time bound all check out
    Valid,
    /// Signature and structure are intact, only `exp` lies in the past
    ExpiredOnly,
    /// Anything else; never carries an identity.
    ///
    /// Decoding reports this through the `Err` arm, so a [`Decoded`] is
    /// never `Invalid`.
    Invalid,
}

/// A token that passed signature and structure checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub identity: Identity,
    /// Either `Valid` or `ExpiredOnly`
    pub validity: Validity,
}

impl Decoded {
    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }
}

/// Reasons a token is classified as invalid, plus signing failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unexpected signing method: {0:?}")]
    UnexpectedAlgorithm(Algorithm),
    #[error("signature is invalid")]
    InvalidSignature,
    #[error("claim '{0}' is missing or has the wrong type")]
    InvalidClaim(&'static str),
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Signs and verifies session tokens with the configured HMAC key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_key()),
            decoding_key: DecodingKey::from_secret(config.signing_key()),
        }
    }

    /// Serialize the identity as token claims and sign it.
    ///
    /// `exp` and `iat` are written verbatim from the identity.
    pub fn encode(&self, identity: &Identity) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), identity, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Verify a token against the current time.
    pub fn decode(&self, token: &str) -> Result<Decoded, TokenError> {
        self.decode_at(token, now_unix())
    }

    /// Verify a token, treating `now` as the current Unix time.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Decoded, TokenError> {
        let header = jsonwebtoken::decode_header(token)?;
        if !is_hmac(header.alg) {
            return Err(TokenError::UnexpectedAlgorithm(header.alg));
        }

        // Expiry is checked below so an expired token can still be materialized.
        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let token_data =
            jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding_key, &validation)?;
        let identity = identity_from_claims(&token_data.claims)?;

        // Checked before expiry so an expired token from the future stays invalid.
        let not_before = numeric_claim(&token_data.claims, "nbf")?;
        if identity.issued_at > now || not_before.is_some_and(|nbf| nbf > now) {
            return Err(TokenError::NotYetValid);
        }

        let validity = if identity.expires_at < now {
            Validity::ExpiredOnly
        } else {
            Validity::Valid
        };

        Ok(Decoded { identity, validity })
    }
}

/// Current UTC time in Unix seconds.
pub fn now_unix() -> i64 {
    jsonwebtoken::get_current_timestamp() as i64
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Map verified claims to an identity.
///
/// `exp` and `iat` must be numbers (fractions are truncated) and
/// `sub`/`iss` must be strings when present. The remaining claims fall back to empty values.
fn identity_from_claims(claims: &Map<String, Value>) -> Result<Identity, TokenError> {
    Ok(Identity {
        expires_at: required_integer(claims, "exp")?,
        issued_at: required_integer(claims, "iat")?,
        issuer: string_claim(claims, "iss")?,
        subject: string_claim(claims, "sub")?,
        name: lenient_string(claims, "name"),
        username: lenient_string(claims, "username"),
        authorities: claims
            .get("authorities")
            .and_then(|value| serde_json::from_value::<Vec<Authority>>(value.clone()).ok())
            .unwrap_or_default(),
    })
}

fn required_integer(claims: &Map<String, Value>, name: &'static str) -> Result<i64, TokenError> {
    numeric_claim(claims, name)?.ok_or(TokenError::InvalidClaim(name))
}

/// A NumericDate claim, `None` when absent.
fn numeric_claim(
    claims: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<i64>, TokenError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Some)
            .ok_or(TokenError::InvalidClaim(name)),
        Some(_) => Err(TokenError::InvalidClaim(name)),
    }
}

fn string_claim(claims: &Map<String, Value>, name: &'static str) -> Result<String, TokenError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(TokenError::InvalidClaim(name)),
    }
}

fn lenient_string(claims: &Map<String, Value>, name: &str) -> String {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
