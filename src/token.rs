//! Identity token issuing and verification
//!
//! Sits outside the policy core. Tokens are HS256 JWTs whose claims carry an
//! arbitrary identity payload plus `iat`/`exp`; once verified, the claims are
//! turned into a [`DataContext`] and handed to the core.

use crate::config::DEFAULT_TOKEN_TTL_SECS;
use crate::error::{PolicyError, Result};
use crate::iam::{json_kind, DataContext};
use crate::secret::SecretHandle;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Default token lifetime when no expiration is given
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(DEFAULT_TOKEN_TTL_SECS);

/// Decoded token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration (seconds since epoch)
    pub exp: i64,

    /// Identity payload fields
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Claims {
    /// Convert to request data: payload scalars plus `iat` and `exp`
    pub fn to_data_context(&self) -> DataContext {
        let mut data = DataContext::from_json_map(&self.payload);
        if let Some(iat) = self.iat {
            data.insert("iat", iat);
        }
        data.insert("exp", self.exp);
        data
    }

    /// Token lifetime, if `iat` is present
    pub fn lifetime(&self) -> Option<Duration> {
        let iat = self.iat?;
        u64::try_from(self.exp - iat).ok().map(Duration::from_secs)
    }
}

/// Sign `payload` into a time-bounded token
///
/// `expiration` defaults to 30 minutes. Any `iat`/`exp` fields in the payload
/// are replaced.
///
/// # Errors
///
/// - `MissingPayload` if `payload` is null
/// - `InvalidPayload` if `payload` is not a JSON object
/// - `InvalidSecret` if `secret` is not UUID-v4 shaped
///
/// # Examples
///
/// ```
/// use access_policy::{sign, verify};
/// use serde_json::json;
///
/// let secret = "ae333df7-3dc4-4c3f-bdcf-a6220a8529ae";
/// let token = sign(&json!({ "id": "abc" }), secret, None).unwrap();
///
/// let claims = verify(&token, secret).unwrap();
/// assert_eq!(claims.payload["id"], "abc");
/// ```
pub fn sign(payload: &Value, secret: &str, expiration: Option<Duration>) -> Result<String> {
    let mut fields = match payload {
        Value::Null => return Err(PolicyError::MissingPayload),
        Value::Object(map) => map.clone(),
        other => return Err(PolicyError::InvalidPayload(json_kind(other).to_string())),
    };
    let secret = SecretHandle::new(secret)?;

    let ttl = expiration.unwrap_or(DEFAULT_EXPIRATION);
    let ttl_secs = i64::try_from(ttl.as_secs())
        .map_err(|_| PolicyError::InvalidInput(format!("expiration too large: {:?}", ttl)))?;

    fields.remove("iat");
    fields.remove("exp");

    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        iat: Some(iat),
        exp: iat.saturating_add(ttl_secs),
        payload: fields,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    debug!("Signed token with {} payload fields, exp {}", claims.payload.len(), claims.exp);

    Ok(token)
}

/// Verify `token` with `secret` and return its claims
///
/// Signature and expiry failures are returned as `PolicyError::Token`
/// holding the underlying error untouched, so callers can match on its kind.
///
/// Expiry is checked with no clock leeway. Tokens must carry an `exp` claim;
/// one without it is rejected as `Token`, so non-expiring tokens from other
/// issuers are not accepted.
///
/// # Errors
///
/// - `MissingToken` if `token` is empty
/// - `MissingSecret` if `secret` is empty
/// - `Token` for malformed, tampered or expired tokens
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    if token.is_empty() {
        return Err(PolicyError::MissingToken);
    }
    if secret.is_empty() {
        return Err(PolicyError::MissingSecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    debug!("Verified token, exp {}", data.claims.exp);

    Ok(data.claims)
}
