//! Restriction evaluation and the end-to-end policy engine
//!
//! The decision model is an allow-list: matched statements are independent
//! alternatives, and the request is allowed if any one of them is satisfied.
//! Absence of a matching statement is a conclusive deny.

use super::condition::DataContext;
use super::matcher::{self, Context, MatchOutcome};
use super::policy::{Policy, Statement};
use super::template;
use crate::config::EngineConfig;
use crate::error::Result;
use tracing::debug;

/// Reduce matched statements and request data to allow (`true`) or deny (`false`)
///
/// - `NoMatch` is always `false`.
/// - A matched statement without a restriction is satisfied unconditionally.
/// - Otherwise at least one matched statement's restriction must hold.
///
/// # Examples
///
/// ```
/// use access_policy::{resource, restriction, Context, DataContext, Restriction, Statement};
///
/// let statements = vec![Statement::new("GET", "/user")
///     .with_restriction(Restriction::equals([("user_id", "X")]))];
/// let matched = resource(&statements, &Context::new("GET", "/user")).unwrap();
///
/// assert!(restriction(&matched, &DataContext::new().with("name", "bob").with("user_id", "X")));
/// assert!(!restriction(&matched, &DataContext::new().with("name", "bob").with("user_id", "Y")));
/// ```
pub fn restriction(matched: &MatchOutcome, data: &DataContext) -> bool {
    match matched {
        MatchOutcome::NoMatch => false,
        MatchOutcome::Matches(statements) => statements.iter().any(|stmt| is_satisfied(stmt, data)),
    }
}

fn is_satisfied(statement: &Statement, data: &DataContext) -> bool {
    match &statement.restriction {
        None => true,
        Some(r) => r.is_satisfied(data),
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No statement grants the action on the resource
    NoMatchingStatement,
    /// Statements matched but none of their restrictions held
    RestrictionFailed,
}

/// Outcome of a full authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Allowed; carries the number of statements that matched
    Allow { matched: usize },
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

/// Policy evaluation engine
///
/// Runs encode → match → restriction for a request. Holds only immutable
/// options, so one engine can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: EngineConfig,
}

impl PolicyEngine {
    /// Create a policy engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        PolicyEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Authorize `context` against `statements` using request `data`
    ///
    /// `data` is used both to resolve resource placeholders and to check
    /// restrictions.
    ///
    /// # Errors
    ///
    /// Fails only when the request cannot be evaluated (empty statements,
    /// empty context, or an unresolved placeholder under the strict policy).
    /// A deny is returned as `Ok(Decision::Deny(..))`.
    pub fn authorize(
        &self,
        statements: &[Statement],
        context: &Context,
        data: &DataContext,
    ) -> Result<Decision> {
        let encoded =
            template::encode_with(statements, data, self.config.unresolved_placeholders)?;
        let matched = matcher::resource(&encoded, context)?;

        let decision = if !matched.is_match() {
            Decision::Deny(DenyReason::NoMatchingStatement)
        } else if restriction(&matched, data) {
            Decision::Allow {
                matched: matched.len(),
            }
        } else {
            Decision::Deny(DenyReason::RestrictionFailed)
        };

        debug!(
            "{} {} -> {:?}",
            context.action, context.resource, decision
        );

        Ok(decision)
    }

    /// Authorize against a loaded policy document
    ///
    /// # Examples
    ///
    /// ```
    /// use access_policy::{Context, DataContext, Policy, PolicyEngine, Statement};
    ///
    /// let engine = PolicyEngine::default();
    /// let mut policy = Policy::new();
    /// policy.add_statement(Statement::new("GET", "/user/${id}"));
    ///
    /// let data = DataContext::new().with("id", "42");
    /// assert!(engine.evaluate(&policy, &Context::new("GET", "/user/42"), &data).unwrap());
    /// assert!(!engine.evaluate(&policy, &Context::new("GET", "/user/7"), &data).unwrap());
    /// ```
    pub fn evaluate(&self, policy: &Policy, context: &Context, data: &DataContext) -> Result<bool> {
        Ok(self.authorize(policy.statements(), context, data)?.is_allowed())
    }
}
