//! Resource template encoding
//!
//! Resource patterns may embed `${name}` tokens. Encoding replaces each token
//! with the textual form of the matching attribute from the request data,
//! producing literal resources the matcher can compare exactly.
//!
//! Names are `[A-Za-z0-9_.-]+`. Anything else that looks like a token
//! (`${}`, an unterminated `${`) is plain text and left alone.

use super::condition::DataContext;
use super::policy::Statement;
use crate::error::{PolicyError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Pattern for placeholder tokens
const PLACEHOLDER_PATTERN: &str = r"\$\{([A-Za-z0-9_.\-]+)\}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// What to do with a placeholder whose key is absent from the request data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Leave the literal `${key}` token in the resource
    #[default]
    Keep,
    /// Fail the whole encoding with `UnresolvedPlaceholder`
    Fail,
}

/// List the placeholder names in a resource pattern, in order of appearance
///
/// # Examples
///
/// ```
/// use access_policy::iam::placeholders;
///
/// assert_eq!(placeholders("/org/${org}/user/${id}"), vec!["org", "id"]);
/// assert!(placeholders("/static").is_empty());
/// ```
pub fn placeholders(resource: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(resource)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Resolve the placeholders of a single resource pattern
pub fn encode_resource(
    resource: &str,
    data: &DataContext,
    unresolved: UnresolvedPolicy,
) -> Result<String> {
    let re = placeholder_regex();
    let mut out = String::with_capacity(resource.len());
    let mut last = 0;

    for caps in re.captures_iter(resource) {
        let (Some(token), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let key = key.as_str();
        out.push_str(&resource[last..token.start()]);

        match data.get(key) {
            Some(value) => out.push_str(&value.to_string()),
            None => match unresolved {
                UnresolvedPolicy::Keep => {
                    warn!("Leaving unresolved placeholder '{}' in {}", token.as_str(), resource);
                    out.push_str(token.as_str());
                }
                UnresolvedPolicy::Fail => {
                    return Err(PolicyError::UnresolvedPlaceholder {
                        key: key.to_string(),
                        resource: resource.to_string(),
                    });
                }
            },
        }

        last = token.end();
    }

    out.push_str(&resource[last..]);
    Ok(out)
}

/// Encode statements with the default policy for absent keys ([`UnresolvedPolicy::Keep`])
///
/// # Errors
///
/// Returns `InvalidInput` if `statements` is empty.
///
/// # Examples
///
/// ```
/// use access_policy::{encode, DataContext, Statement};
///
/// let statements = vec![Statement::new("GET", "/user/${id}")];
/// let data = DataContext::new().with("id", "ddff64c5-1c16-4aaf-9d1b-07f2552831b1");
///
/// let encoded = encode(&statements, &data).unwrap();
/// assert_eq!(encoded[0].action, "GET");
/// assert_eq!(encoded[0].resource, "/user/ddff64c5-1c16-4aaf-9d1b-07f2552831b1");
/// assert_eq!(statements[0].resource, "/user/${id}");
/// ```
pub fn encode(statements: &[Statement], data: &DataContext) -> Result<Vec<Statement>> {
    encode_with(statements, data, UnresolvedPolicy::default())
}

/// Encode statements, resolving every resource pattern against `data`
///
/// Returns new statements; only `resource` changes, `action` and
/// `restriction` are copied verbatim.
pub fn encode_with(
    statements: &[Statement],
    data: &DataContext,
    unresolved: UnresolvedPolicy,
) -> Result<Vec<Statement>> {
    if statements.is_empty() {
        return Err(PolicyError::InvalidInput(
            "Must include statements to encode".to_string(),
        ));
    }

    let encoded = statements
        .iter()
        .map(|stmt| {
            Ok(Statement {
                action: stmt.action.clone(),
                resource: encode_resource(&stmt.resource, data, unresolved)?,
                restriction: stmt.restriction.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Encoded {} statements", encoded.len());
    Ok(encoded)
}
