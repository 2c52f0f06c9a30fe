//! # access-policy - Attribute-Based Authorization Policies
//!
//! `access-policy-rs` decides whether a request (an action on a resource) is
//! permitted by a set of allow-list statements, and whether the request's
//! attributes satisfy each statement's restriction.
//!
//! - **Templated resources**: `/user/${id}` resolved per request
//! - **Exact matching** of action and resource
//! - **Attribute restrictions** (equality) combined as alternatives
//! - **Identity tokens**: HS256 JWTs whose claims feed the attribute data
//!
//! ## Quick Start
//!
//! ```rust
//! use access_policy::{encode, resource, restriction, Context, DataContext, Statement};
//!
//! # fn main() -> access_policy::Result<()> {
//! let statements = vec![Statement::new("GET", "/user/${id}")];
//! let data = DataContext::new().with("id", "ddff64c5-1c16-4aaf-9d1b-07f2552831b1");
//!
//! // Bake request values into resource patterns
//! let encoded = encode(&statements, &data)?;
//!
//! // Narrow to statements for this action/resource
//! let matched = resource(
//!     &encoded,
//!     &Context::new("GET", "/user/ddff64c5-1c16-4aaf-9d1b-07f2552831b1"),
//! )?;
//!
//! // Check restrictions
//! assert!(restriction(&matched, &data));
//! # Ok(())
//! # }
//! ```
//!
//! ## With Tokens
//!
//! ```rust
//! use access_policy::{sign, verify, Context, Policy, PolicyEngine};
//! use serde_json::json;
//!
//! # fn main() -> access_policy::Result<()> {
//! let secret = "ae333df7-3dc4-4c3f-bdcf-a6220a8529ae";
//! let token = sign(&json!({ "user_id": "42" }), secret, None)?;
//!
//! let data = verify(&token, secret)?.to_data_context();
//! let policy = Policy::from_json(r#"[
//!     { "action": "GET", "resource": "/user/${user_id}",
//!       "restriction": { "equals": { "user_id": "42" } } }
//! ]"#)?;
//!
//! let engine = PolicyEngine::default();
//! assert!(engine.evaluate(&policy, &Context::new("GET", "/user/42"), &data)?);
//! # Ok(())
//! # }
//! ```

// Policy core
pub mod core;

pub mod secret;
pub mod token;

// Re-export core modules internally so crate:: paths still work
#[allow(unused_imports)]
pub(crate) use crate::core::{config, error};

pub use crate::core::iam;

pub use crate::core::{
    config::EngineConfig,
    error::{ErrorCategory, PolicyError, Result},
    iam::{
        encode, encode_with, resource, restriction, AttributeValue, Context, DataContext,
        Decision, DenyReason, MatchOutcome, Policy, PolicyEngine, Restriction, Statement,
        UnresolvedPolicy,
    },
};
pub use secret::SecretHandle;
pub use token::{sign, verify, Claims};
