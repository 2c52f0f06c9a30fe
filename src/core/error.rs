use thiserror::Error;

/// Broad failure classes, so callers can tell "the policy evaluated cleanly to
/// deny" (a plain `false`) from "the policy could not be evaluated at all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required argument is missing or structurally invalid
    Input,
    /// A token boundary argument has the wrong shape
    Format,
    /// The token issuer/verifier rejected the token
    Token,
    /// A policy or config document could not be read or parsed
    Load,
}

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Statement {index} is malformed: {reason}")]
    InvalidStatement { index: usize, reason: String },

    #[error("Unresolved placeholder '${{{key}}}' in resource '{resource}'")]
    UnresolvedPlaceholder { key: String, resource: String },

    #[error("Incorrect secret type, must be UUIDV4: {0}")]
    InvalidSecret(String),

    #[error("Signature data missing")]
    MissingPayload,

    #[error("Signature data must be a JSON object, got {0}")]
    InvalidPayload(String),

    #[error("jwt must be provided")]
    MissingToken,

    #[error("secret or public key must be provided")]
    MissingSecret,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported document format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PolicyError {
    /// Which failure class this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            PolicyError::InvalidInput(_)
            | PolicyError::InvalidStatement { .. }
            | PolicyError::UnresolvedPlaceholder { .. } => ErrorCategory::Input,
            PolicyError::InvalidSecret(_)
            | PolicyError::MissingPayload
            | PolicyError::InvalidPayload(_) => ErrorCategory::Format,
            PolicyError::MissingToken | PolicyError::MissingSecret | PolicyError::Token(_) => {
                ErrorCategory::Token
            }
            PolicyError::Serialization(_)
            | PolicyError::Toml(_)
            | PolicyError::UnsupportedFormat(_)
            | PolicyError::InvalidConfig(_)
            | PolicyError::Io(_) => ErrorCategory::Load,
        }
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
