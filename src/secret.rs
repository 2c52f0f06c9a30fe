//! Token secret handles
//!
//! Secrets used to sign identity tokens must be presented as UUID-v4 shaped
//! strings rather than free-form passphrases. This is a format gate only; it
//! says nothing about how the secret was generated.

use crate::error::{PolicyError, Result};
use std::fmt;
use uuid::{Uuid, Variant};

/// A validated UUID-v4 shaped secret
///
/// # Rules
/// - Hyphenated form only: `xxxxxxxx-xxxx-4xxx-Yxxx-xxxxxxxxxxxx`
/// - Version nibble is `4`, variant nibble `Y` is one of `8`, `9`, `a`, `b`
/// - Hex digits in either case
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretHandle(String);

impl SecretHandle {
    /// Create a new validated secret handle
    ///
    /// # Errors
    ///
    /// Returns `InvalidSecret` if the value is not UUID-v4 shaped.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_policy::SecretHandle;
    ///
    /// assert!(SecretHandle::new("ae333df7-3dc4-4c3f-bdcf-a6220a8529ae").is_ok());
    /// assert!(SecretHandle::new("12345").is_err());
    /// assert!(SecretHandle::new("correct horse battery staple").is_err());
    /// ```
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();

        // try_parse also takes the simple, braced and urn forms
        if secret.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(Self::rejected(&secret));
        }

        match Uuid::try_parse(&secret) {
            Ok(id) if id.get_version_num() == 4 && id.get_variant() == Variant::RFC4122 => {
                Ok(SecretHandle(secret))
            }
            _ => Err(Self::rejected(&secret)),
        }
    }

    fn rejected(secret: &str) -> PolicyError {
        PolicyError::InvalidSecret(format!(
            "expected a UUID-v4 string, got {} characters",
            secret.len()
        ))
    }

    /// Generate a fresh random handle
    pub fn generate() -> Self {
        SecretHandle(Uuid::new_v4().to_string())
    }

    /// Get the secret as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<str> for SecretHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHandle(****)")
    }
}
