//! Statement matching
//!
//! Narrows a statement set to the statements that grant the requested action
//! on the requested resource. Matching is exact string equality on both
//! fields; resources must already be resolved by the template encoder or be
//! written literally.

use super::policy::Statement;
use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The concrete action/resource pair being authorized
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Resource")]
    pub resource: String,
}

impl Context {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Context {
            action: action.into(),
            resource: resource.into(),
        }
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.action.is_empty() {
            return Err(PolicyError::InvalidInput(
                "context action must not be empty".to_string(),
            ));
        }
        if self.resource.is_empty() {
            return Err(PolicyError::InvalidInput(
                "context resource must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of matching statements against a context
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// One or more statements apply, in their original order
    Matches(Vec<Statement>),
    /// No statement applies
    NoMatch,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matches(_))
    }

    /// Matched statements (empty for `NoMatch`)
    pub fn statements(&self) -> &[Statement] {
        match self {
            MatchOutcome::Matches(statements) => statements,
            MatchOutcome::NoMatch => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.statements().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_match()
    }

    /// Boundary view for callers that expect "statements or nothing"
    pub fn into_option(self) -> Option<Vec<Statement>> {
        match self {
            MatchOutcome::Matches(statements) => Some(statements),
            MatchOutcome::NoMatch => None,
        }
    }
}

impl From<Vec<Statement>> for MatchOutcome {
    fn from(statements: Vec<Statement>) -> Self {
        if statements.is_empty() {
            MatchOutcome::NoMatch
        } else {
            MatchOutcome::Matches(statements)
        }
    }
}

/// Find the statements that apply to `context`
///
/// Every statement is checked; matches are returned in input order. Zero
/// matches is the ordinary [`MatchOutcome::NoMatch`] result, not an error.
///
/// # Errors
///
/// Returns `InvalidInput` if `statements` is empty or the context has an
/// empty action or resource.
///
/// # Examples
///
/// ```
/// use access_policy::{resource, Context, MatchOutcome, Statement};
///
/// let statements = vec![Statement::new("GET", "/user")];
///
/// let hit = resource(&statements, &Context::new("GET", "/user")).unwrap();
/// assert_eq!(hit.len(), 1);
///
/// let miss = resource(&statements, &Context::new("GET", "/other")).unwrap();
/// assert_eq!(miss, MatchOutcome::NoMatch);
/// ```
pub fn resource(statements: &[Statement], context: &Context) -> Result<MatchOutcome> {
    if statements.is_empty() {
        return Err(PolicyError::InvalidInput(
            "Must include statements to match".to_string(),
        ));
    }
    context.ensure_valid()?;

    let matched: Vec<Statement> = statements
        .iter()
        .filter(|stmt| stmt.applies_to(&context.action, &context.resource))
        .cloned()
        .collect();

    debug!(
        "{} of {} statements match {} {}",
        matched.len(),
        statements.len(),
        context.action,
        context.resource
    );

    Ok(MatchOutcome::from(matched))
}
