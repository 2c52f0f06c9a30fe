//! Attribute-based access policies
//!
//! Evaluates requests against allow-list statements:
//! - Resource templates with `${name}` placeholders, resolved per request
//! - Exact action/resource matching
//! - Attribute restrictions (equality) combined as alternatives

mod condition;
mod engine;
mod matcher;
mod policy;
mod template;

pub use condition::{AttributeValue, DataContext, Restriction};
pub use engine::{restriction, Decision, DenyReason, PolicyEngine};
pub use matcher::{resource, Context, MatchOutcome};
pub use policy::{Policy, Statement};
pub use template::{encode, encode_resource, encode_with, placeholders, UnresolvedPolicy};

pub(crate) use condition::json_kind;

#[cfg(test)]
mod tests;
