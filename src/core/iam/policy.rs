//! Policy document structure
//!
//! A policy is an allow-list of statements. Each statement grants one action
//! on one resource, optionally narrowed by an attribute restriction. Resource
//! patterns may embed `${name}` placeholders that are resolved per request by
//! the template encoder before matching.

use super::condition::Restriction;
use super::template;
use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Statement {
    /// Action this statement grants (exact, case-sensitive)
    #[serde(default)]
    #[validate(length(min = 1, message = "action must not be empty"))]
    pub action: String,

    /// Resource pattern, possibly containing `${name}` placeholders
    #[serde(default)]
    #[validate(length(min = 1, message = "resource must not be empty"))]
    pub resource: String,

    /// Optional attribute condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<Restriction>,
}

impl Statement {
    /// Create an unrestricted statement
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Statement {
            action: action.into(),
            resource: resource.into(),
            restriction: None,
        }
    }

    /// Attach a restriction
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = Some(restriction);
        self
    }

    /// Check if this statement applies to the given action and resource
    ///
    /// Both comparisons are exact string equality; the resource must already
    /// be fully resolved.
    pub fn applies_to(&self, action: &str, resource: &str) -> bool {
        self.action == action && self.resource == resource
    }

    /// Whether the resource pattern contains placeholders
    pub fn is_templated(&self) -> bool {
        !template::placeholders(&self.resource).is_empty()
    }

    /// Check the statement's shape, reporting `index` as its position
    pub fn ensure_valid(&self, index: usize) -> Result<()> {
        Validate::validate(self).map_err(|errors| PolicyError::InvalidStatement {
            index,
            reason: errors.to_string(),
        })?;

        if let Some(restriction) = &self.restriction {
            if restriction.keys().any(str::is_empty) {
                return Err(PolicyError::InvalidStatement {
                    index,
                    reason: "restriction attribute names must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Accepted top-level shapes for a JSON policy document
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyDocument {
    Bare(Vec<Statement>),
    Full(Policy),
}

/// Complete policy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Policy statements, in evaluation order
    #[serde(default)]
    pub statements: Vec<Statement>,
}

fn default_version() -> String {
    Policy::VERSION.to_string()
}

impl Policy {
    /// Current policy format version
    pub const VERSION: &'static str = "2024-01-01";

    /// Create a new empty policy
    pub fn new() -> Self {
        Policy {
            version: default_version(),
            statements: Vec::new(),
        }
    }

    /// Create a policy from statements, validating them
    pub fn from_statements(statements: Vec<Statement>) -> Result<Self> {
        let policy = Policy {
            version: default_version(),
            statements,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Add a statement to this policy
    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Parse and validate a policy from JSON
    ///
    /// Accepts either a full document (`{"version": ..., "statements": [...]}`)
    /// or a bare array of statements.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_policy::Policy;
    ///
    /// let policy = Policy::from_json(r#"[{"action": "GET", "resource": "/user/${id}"}]"#).unwrap();
    /// assert_eq!(policy.statements().len(), 1);
    /// assert!(policy.statements()[0].is_templated());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let policy = match serde_json::from_str::<PolicyDocument>(json)? {
            PolicyDocument::Bare(statements) => Policy {
                version: default_version(),
                statements,
            },
            PolicyDocument::Full(policy) => policy,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Parse and validate a policy from TOML
    pub fn from_toml(source: &str) -> Result<Self> {
        let policy: Policy = toml::from_str(source)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy file, choosing the format by extension (`.json` or `.toml`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        let policy = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&source)?,
            Some("toml") => Self::from_toml(&source)?,
            other => {
                return Err(PolicyError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        debug!(
            "Loaded policy {:?}: {} statements ({} templated)",
            path,
            policy.statements.len(),
            policy.statements.iter().filter(|s| s.is_templated()).count()
        );

        Ok(policy)
    }

    /// Serialize policy to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate policy structure
    pub fn validate(&self) -> Result<()> {
        if self.statements.is_empty() {
            return Err(PolicyError::InvalidInput(
                "policy must have at least one statement".to_string(),
            ));
        }

        for (i, stmt) in self.statements.iter().enumerate() {
            stmt.ensure_valid(i)?;
        }

        Ok(())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}
