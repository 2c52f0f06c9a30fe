//! Attribute values, request data and statement restrictions
//!
//! A restriction narrows when a statement's permission applies, based on
//! attributes supplied per request (usually the decoded identity payload).
//! Only equality is supported today; new operators become new variants of
//! [`Restriction`] without changing how the evaluator consumes them.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::trace;

/// Scalar attribute value (string, number or boolean)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl AttributeValue {
    /// Convert a JSON value, returning `None` for null, arrays and objects
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(AttributeValue::String(s.clone())),
            Value::Number(n) => n.as_f64().map(AttributeValue::Number),
            Value::Bool(b) => Some(AttributeValue::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Number(_) => "number",
            AttributeValue::Bool(_) => "boolean",
        }
    }
}

/// Textual form used when a value is substituted into a resource pattern.
/// Integral numbers print without a fractional part (`42`, not `42.0`),
/// negative zero prints as `0`, and numbers are always plain decimal
/// (`1e21` prints all 22 digits, never an exponent).
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Number(n) if *n == 0.0 => f.write_str("0"),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Request-scoped attributes used for template resolution and restriction checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext {
    attributes: HashMap<String, AttributeValue>,
}

impl DataContext {
    /// Create an empty data context
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a data context from a JSON value
    ///
    /// The value must be an object. Scalar members become attributes; null,
    /// array and object members cannot take part in equality checks or
    /// substitution and are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `value` is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_policy::DataContext;
    /// use serde_json::json;
    ///
    /// let data = DataContext::from_json(&json!({ "id": "abc", "admin": true })).unwrap();
    /// assert_eq!(data.len(), 2);
    /// assert!(DataContext::from_json(&json!(["not", "a", "map"])).is_err());
    /// ```
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_json_map(map)),
            other => Err(PolicyError::InvalidInput(format!(
                "data context must be a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Build a data context from the members of a JSON object
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut attributes = HashMap::with_capacity(map.len());
        for (key, value) in map {
            match AttributeValue::from_json(value) {
                Some(v) => {
                    attributes.insert(key.clone(), v);
                }
                None => trace!("Skipping non-scalar attribute '{}'", key),
            }
        }
        DataContext { attributes }
    }

    /// Add an attribute, returning the updated context
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an attribute
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Copy every attribute of `other` into this context, replacing existing keys
    pub fn extend(&mut self, other: DataContext) {
        self.attributes.extend(other.attributes);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<HashMap<String, AttributeValue>> for DataContext {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        DataContext { attributes }
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for DataContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        DataContext {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Attribute condition attached to a statement
///
/// Serialized externally tagged by operator name:
/// `{ "equals": { "user_id": "..." } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restriction {
    /// Every listed attribute must be present and strictly equal
    Equals(BTreeMap<String, AttributeValue>),
}

impl Restriction {
    /// Equality restriction over the given attribute/value pairs
    pub fn equals<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Restriction::Equals(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Evaluate this restriction against request data
    ///
    /// Comparison is strict: a value only equals another of the same kind,
    /// so the string `"1"` never satisfies an expected number `1`.
    pub fn is_satisfied(&self, data: &DataContext) -> bool {
        match self {
            Restriction::Equals(expected) => expected.iter().all(|(key, want)| {
                match data.get(key) {
                    Some(actual) if actual == want => true,
                    Some(actual) => {
                        trace!(
                            "Restriction on '{}' failed: expected {} {}, got {} {}",
                            key,
                            want.type_name(),
                            want,
                            actual.type_name(),
                            actual
                        );
                        false
                    }
                    None => {
                        trace!("Restriction on '{}' failed: attribute missing", key);
                        false
                    }
                }
            }),
        }
    }

    /// Attribute names this restriction reads
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        match self {
            Restriction::Equals(expected) => expected.keys().map(String::as_str),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
