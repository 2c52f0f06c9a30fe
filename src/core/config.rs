//! Engine configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! unresolved_placeholders = "fail"   # or "keep" (default)
//! token_ttl_secs = 1800              # 1..=86400
//! ```

use crate::error::{PolicyError, Result};
use crate::iam::UnresolvedPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Default token lifetime (30 minutes)
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 60;

/// Engine and token settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Handling of `${key}` tokens whose key is absent from the request data
    pub unresolved_placeholders: UnresolvedPolicy,

    /// Lifetime of issued tokens, in seconds
    #[validate(range(min = 1, max = 86400, message = "token_ttl_secs must be within 1..=86400"))]
    pub token_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            unresolved_placeholders: UnresolvedPolicy::Keep,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Validate all fields
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| PolicyError::InvalidConfig(errors.to_string()))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
