//! Policy operation types and their merge/apply semantics.
//!
//! A [`PolicyOperation`] is one atomic constraint an authority places on a
//! metadata parameter, e.g. `"scopes": {"subset_of": ["openid", "email"]}`.
//! Operations are immutable once constructed: every constructor validates the
//! configuration shape, so a half-configured operation is not a representable
//! state.

use std::borrow::Cow;
use std::fmt;
use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

pub mod combination;
pub mod registry;

use registry::CustomOperation;

/// Wire name of a policy operation, e.g. `"subset_of"`.
///
/// Names compare by value and are usable as map keys. The standard operation
/// names are available as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationName(Cow<'static, str>);

impl OperationName {
    /// The `value` (fixed value) operation.
    pub const VALUE: OperationName = OperationName(Cow::Borrowed("value"));

    /// The `subset_of` (allowed values) operation.
    pub const SUBSET_OF: OperationName = OperationName(Cow::Borrowed("subset_of"));

    /// The `superset_of` (required values) operation.
    pub const SUPERSET_OF: OperationName = OperationName(Cow::Borrowed("superset_of"));

    /// The `one_of` (candidate values) operation.
    pub const ONE_OF: OperationName = OperationName(Cow::Borrowed("one_of"));

    /// The `add` (unconditional append) operation.
    pub const ADD: OperationName = OperationName(Cow::Borrowed("add"));

    /// The `default` (fallback value) operation.
    pub const DEFAULT: OperationName = OperationName(Cow::Borrowed("default"));

    /// The `essential` (presence required) operation.
    pub const ESSENTIAL: OperationName = OperationName(Cow::Borrowed("essential"));

    /// Creates an operation name from an arbitrary string.
    pub fn new(name: impl Into<String>) -> Self {
        OperationName(Cow::Owned(name.into()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is one of the seven standard operation names.
    pub fn is_standard(&self) -> bool {
        matches!(
            self.as_str(),
            "value" | "subset_of" | "superset_of" | "one_of" | "add" | "default" | "essential"
        )
    }
}

impl Display for OperationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OperationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationName {
    fn from(name: String) -> Self {
        OperationName(Cow::Owned(name))
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// An error that can arise configuring, merging or applying a single
/// [`PolicyOperation`].
///
/// Operation errors carry the operation name but not the metadata parameter;
/// the policy layer wraps them with the parameter (and, during a chain fold,
/// the authority index) before they reach the caller.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum OperationError {
    /// The configuration value has a JSON shape the operation does not accept.
    #[error("\"{operation}\" expects {expected}, found {found}")]
    TypeMismatch {
        /// The operation that rejected the configuration.
        operation: OperationName,
        /// Accepted configuration shapes.
        expected: &'static str,
        /// The JSON type that was provided.
        found: &'static str,
    },

    /// The raw configuration value is malformed, e.g. a list with a
    /// non-string element.
    #[error("cannot parse configuration of \"{operation}\": {reason}")]
    Parse {
        /// The operation whose configuration failed to parse.
        operation: OperationName,
        /// Human-readable cause.
        reason: String,
    },

    /// A semantic conflict: incompatible fixed values at merge time, or an
    /// existing metadata value that fails the operation's check at apply time.
    #[error("\"{operation}\": {reason}")]
    Violation {
        /// The operation that detected the conflict.
        operation: OperationName,
        /// Human-readable cause.
        reason: String,
    },

    /// Two different operation variants were merged. This is engine misuse,
    /// not a policy conflict.
    #[error("cannot merge \"{left}\" with \"{right}\"")]
    MergeMismatch {
        /// Name of the left operand.
        left: OperationName,
        /// Name of the right operand.
        right: OperationName,
    },

    /// The operation name has no built-in variant and no registered handler.
    #[error("no policy operation registered under \"{operation}\"")]
    Unsupported {
        /// The unknown operation name.
        operation: OperationName,
    },
}

/// Configuration value of a policy operation, carrying exactly one of the
/// four shapes the wire format allows.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationConfig {
    /// A JSON boolean.
    Boolean(bool),
    /// A JSON string.
    Text(String),
    /// A JSON array of strings, order preserved.
    List(Vec<String>),
    /// An arbitrary JSON value, only acceptable to custom operations.
    Untyped(Value),
}

impl OperationConfig {
    /// Classifies a raw decoded JSON value into one of the typed shapes.
    ///
    /// Booleans, strings and arrays of strings map to the matching shape; a
    /// list with a non-string element or any other JSON type is a parse
    /// error. Custom operations bypass this and keep the raw value.
    pub fn classify(operation: &OperationName, raw: &Value) -> Result<Self, OperationError> {
        match raw {
            Value::Bool(flag) => Ok(Self::Boolean(*flag)),
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(text) => list.push(text.to_owned()),
                        None => {
                            return Err(OperationError::Parse {
                                operation: operation.clone(),
                                reason: format!(
                                    "list element is not a string ({})",
                                    json_type_name(item)
                                ),
                            })
                        }
                    }
                }
                Ok(Self::List(list))
            }
            other => Err(OperationError::Parse {
                operation: operation.clone(),
                reason: format!("unexpected JSON type ({})", json_type_name(other)),
            }),
        }
    }

    /// Returns the boolean configuration, if this is the boolean shape.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the string configuration, if this is the string shape.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the string-list configuration, if this is the list shape.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Converts the configuration back to its wire representation.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Boolean(flag) => Value::Bool(*flag),
            Self::Text(text) => Value::String(text.clone()),
            Self::List(list) => Value::Array(list.iter().cloned().map(Value::String).collect()),
            Self::Untyped(value) => value.clone(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "string",
            Self::List(_) => "string list",
            Self::Untyped(_) => "untyped value",
        }
    }
}

/// One atomic, fully configured policy constraint for a metadata parameter.
///
/// The seven standard variants implement the operation semantics of OpenID
/// Connect Federation 1.0; [`Custom`](Self::Custom) carries an extension
/// operation whose behavior lives in a registered
/// [`CustomOperationHandler`](registry::CustomOperationHandler).
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOperation {
    /// Fixes the parameter to a literal value, discarding whatever the leaf
    /// asserted.
    Value(OperationConfig),
    /// Restricts a list parameter to the configured set of allowed values.
    SubsetOf(Vec<String>),
    /// Requires a list parameter to contain every configured value.
    SupersetOf(Vec<String>),
    /// Requires a string parameter to be one of the configured candidates.
    OneOf(Vec<String>),
    /// Unconditionally appends the configured values to a list parameter.
    Add(Vec<String>),
    /// Supplies a fallback used when the leaf left the parameter unset.
    Default(OperationConfig),
    /// Marks the parameter as required (sticky across the chain).
    Essential(bool),
    /// An extension operation resolved through the registry.
    Custom(CustomOperation),
}

impl PolicyOperation {
    /// Creates a `value` operation. Accepts a boolean, string or string-list
    /// configuration.
    pub fn value(config: OperationConfig) -> Result<Self, OperationError> {
        match &config {
            OperationConfig::Untyped(value) => Err(OperationError::TypeMismatch {
                operation: OperationName::VALUE,
                expected: "a boolean, string or string list",
                found: json_type_name(value),
            }),
            _ => Ok(Self::Value(config)),
        }
    }

    /// Creates a `subset_of` operation from the allowed values.
    pub fn subset_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SubsetOf(allowed.into_iter().map(Into::into).collect())
    }

    /// Creates a `superset_of` operation from the required values.
    pub fn superset_of<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SupersetOf(required.into_iter().map(Into::into).collect())
    }

    /// Creates a `one_of` operation from the candidate values.
    pub fn one_of<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(candidates.into_iter().map(Into::into).collect())
    }

    /// Creates an `add` operation from the values to append.
    pub fn add<I, S>(additions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Add(additions.into_iter().map(Into::into).collect())
    }

    /// Creates a `default` operation. Accepts a boolean, string or
    /// string-list configuration.
    pub fn default_value(config: OperationConfig) -> Result<Self, OperationError> {
        match &config {
            OperationConfig::Untyped(value) => Err(OperationError::TypeMismatch {
                operation: OperationName::DEFAULT,
                expected: "a boolean, string or string list",
                found: json_type_name(value),
            }),
            _ => Ok(Self::Default(config)),
        }
    }

    /// Creates an `essential` operation.
    pub fn essential(required: bool) -> Self {
        Self::Essential(required)
    }

    /// Returns the wire name of this operation.
    pub fn name(&self) -> OperationName {
        match self {
            Self::Value(_) => OperationName::VALUE,
            Self::SubsetOf(_) => OperationName::SUBSET_OF,
            Self::SupersetOf(_) => OperationName::SUPERSET_OF,
            Self::OneOf(_) => OperationName::ONE_OF,
            Self::Add(_) => OperationName::ADD,
            Self::Default(_) => OperationName::DEFAULT,
            Self::Essential(_) => OperationName::ESSENTIAL,
            Self::Custom(custom) => custom.name().clone(),
        }
    }

    /// Returns the boolean configuration, for the shapes that carry one.
    pub fn boolean_configuration(&self) -> Option<bool> {
        match self {
            Self::Value(config) | Self::Default(config) => config.as_boolean(),
            Self::Essential(required) => Some(*required),
            _ => None,
        }
    }

    /// Returns the string configuration, for the shapes that carry one.
    pub fn string_configuration(&self) -> Option<&str> {
        match self {
            Self::Value(config) | Self::Default(config) => config.as_text(),
            _ => None,
        }
    }

    /// Returns the string-list configuration, for the shapes that carry one.
    pub fn string_list_configuration(&self) -> Option<&[String]> {
        match self {
            Self::Value(config) | Self::Default(config) => config.as_list(),
            Self::SubsetOf(list) | Self::SupersetOf(list) | Self::OneOf(list) | Self::Add(list) => {
                Some(list)
            }
            _ => None,
        }
    }

    /// Parses a standard operation from its wire name and raw configuration.
    ///
    /// Returns `Ok(None)` for non-standard names so the registry can consult
    /// its custom handlers.
    pub(crate) fn parse_standard(
        name: &OperationName,
        raw: &Value,
    ) -> Result<Option<Self>, OperationError> {
        let operation = match name.as_str() {
            "value" => Self::value(OperationConfig::classify(name, raw)?)?,
            "subset_of" => Self::SubsetOf(classify_list(name, raw)?),
            "superset_of" => Self::SupersetOf(classify_list(name, raw)?),
            "one_of" => Self::OneOf(classify_list(name, raw)?),
            "add" => match OperationConfig::classify(name, raw)? {
                OperationConfig::Text(text) => Self::Add(vec![text]),
                OperationConfig::List(list) => Self::Add(list),
                other => {
                    return Err(OperationError::TypeMismatch {
                        operation: name.clone(),
                        expected: "a string or string list",
                        found: other.kind_name(),
                    })
                }
            },
            "default" => Self::default_value(OperationConfig::classify(name, raw)?)?,
            "essential" => match OperationConfig::classify(name, raw)? {
                OperationConfig::Boolean(required) => Self::Essential(required),
                other => {
                    return Err(OperationError::TypeMismatch {
                        operation: name.clone(),
                        expected: "a boolean",
                        found: other.kind_name(),
                    })
                }
            },
            _ => return Ok(None),
        };
        Ok(Some(operation))
    }

    /// Merges this operation with another instance of the same variant,
    /// producing a new operation. Neither input is modified.
    ///
    /// Merge is commutative and associative for every standard variant, which
    /// is what makes the sequential chain fold well defined.
    ///
    /// # Errors
    ///
    /// [`OperationError::Violation`] on a semantic conflict (unequal `value`
    /// or `default` literals, empty `one_of` intersection) and
    /// [`OperationError::MergeMismatch`] when the variants differ.
    pub fn merge(&self, other: &PolicyOperation) -> Result<PolicyOperation, OperationError> {
        match (self, other) {
            (Self::Value(left), Self::Value(right)) => {
                if left == right {
                    Ok(Self::Value(left.clone()))
                } else {
                    Err(OperationError::Violation {
                        operation: OperationName::VALUE,
                        reason: "value mismatch".to_owned(),
                    })
                }
            }
            (Self::SubsetOf(left), Self::SubsetOf(right)) => {
                // An empty intersection is a valid "nothing permitted" result.
                Ok(Self::SubsetOf(intersection(left, right)))
            }
            (Self::SupersetOf(left), Self::SupersetOf(right)) => {
                Ok(Self::SupersetOf(union(left, right)))
            }
            (Self::OneOf(left), Self::OneOf(right)) => {
                let common = intersection(left, right);
                if common.is_empty() {
                    Err(OperationError::Violation {
                        operation: OperationName::ONE_OF,
                        reason: "no common candidate value".to_owned(),
                    })
                } else {
                    Ok(Self::OneOf(common))
                }
            }
            (Self::Add(left), Self::Add(right)) => Ok(Self::Add(union(left, right))),
            (Self::Default(left), Self::Default(right)) => {
                if left == right {
                    Ok(Self::Default(left.clone()))
                } else {
                    Err(OperationError::Violation {
                        operation: OperationName::DEFAULT,
                        reason: "default value mismatch".to_owned(),
                    })
                }
            }
            (Self::Essential(left), Self::Essential(right)) => {
                // Sticky: once any authority requires the parameter, it stays
                // required.
                Ok(Self::Essential(*left || *right))
            }
            (Self::Custom(left), Self::Custom(right)) if left.name() == right.name() => {
                left.merge(right).map(Self::Custom)
            }
            (left, right) => Err(OperationError::MergeMismatch {
                left: left.name(),
                right: right.name(),
            }),
        }
    }

    /// Applies this operation to the leaf's current value for a parameter.
    ///
    /// `None` means the parameter is absent from the leaf metadata; returning
    /// `None` keeps it absent.
    ///
    /// # Errors
    ///
    /// [`OperationError::Violation`] when the existing value is incompatible
    /// with the constraint (e.g. a `one_of` value outside the candidate set,
    /// or an `essential` parameter that is absent).
    pub fn apply(&self, value: Option<&Value>) -> Result<Option<Value>, OperationError> {
        match self {
            Self::Value(config) => Ok(Some(config.to_value())),
            Self::SubsetOf(allowed) => match value {
                None => Ok(None),
                Some(Value::Array(items)) => {
                    // Leaf order wins; elements outside the allowed set are
                    // silently dropped, not rejected.
                    let kept = items
                        .iter()
                        .filter(|item| {
                            item.as_str()
                                .is_some_and(|text| allowed.iter().any(|a| a == text))
                        })
                        .cloned()
                        .collect();
                    Ok(Some(Value::Array(kept)))
                }
                Some(other) => Err(list_expected(OperationName::SUBSET_OF, other)),
            },
            Self::SupersetOf(required) => match value {
                None => Ok(None),
                Some(Value::Array(items)) => {
                    for req in required {
                        if !items.iter().any(|item| item.as_str() == Some(req)) {
                            return Err(OperationError::Violation {
                                operation: OperationName::SUPERSET_OF,
                                reason: format!("missing required value \"{req}\""),
                            });
                        }
                    }
                    Ok(Some(Value::Array(items.clone())))
                }
                Some(other) => Err(list_expected(OperationName::SUPERSET_OF, other)),
            },
            Self::OneOf(candidates) => match value {
                None => Ok(None),
                Some(Value::String(text)) => {
                    if candidates.iter().any(|c| c == text) {
                        Ok(Some(Value::String(text.clone())))
                    } else {
                        Err(OperationError::Violation {
                            operation: OperationName::ONE_OF,
                            reason: format!("\"{text}\" is not a permitted value"),
                        })
                    }
                }
                Some(other) => Err(OperationError::Violation {
                    operation: OperationName::ONE_OF,
                    reason: format!("expected a string, found {}", json_type_name(other)),
                }),
            },
            Self::Add(additions) => match value {
                None => Ok(Some(Value::Array(
                    additions.iter().cloned().map(Value::String).collect(),
                ))),
                Some(Value::Array(items)) => {
                    let mut merged = items.clone();
                    for addition in additions {
                        if !merged.iter().any(|item| item.as_str() == Some(addition)) {
                            merged.push(Value::String(addition.clone()));
                        }
                    }
                    Ok(Some(Value::Array(merged)))
                }
                Some(other) => Err(list_expected(OperationName::ADD, other)),
            },
            Self::Default(config) => match value {
                None | Some(Value::Null) => Ok(Some(config.to_value())),
                Some(Value::String(text)) if text.is_empty() => Ok(Some(config.to_value())),
                Some(Value::Array(items)) if items.is_empty() => Ok(Some(config.to_value())),
                Some(present) => Ok(Some(present.clone())),
            },
            Self::Essential(required) => match value {
                None | Some(Value::Null) => {
                    if *required {
                        Err(OperationError::Violation {
                            operation: OperationName::ESSENTIAL,
                            reason: "required parameter is absent".to_owned(),
                        })
                    } else {
                        Ok(value.cloned())
                    }
                }
                Some(present) => Ok(Some(present.clone())),
            },
            Self::Custom(custom) => custom.apply(value),
        }
    }

    /// Returns the wire value of this operation, the structural inverse of
    /// parsing its configuration.
    pub fn to_wire_value(&self) -> Value {
        match self {
            Self::Value(config) | Self::Default(config) => config.to_value(),
            Self::SubsetOf(list) | Self::SupersetOf(list) | Self::OneOf(list) | Self::Add(list) => {
                Value::Array(list.iter().cloned().map(Value::String).collect())
            }
            Self::Essential(required) => Value::Bool(*required),
            Self::Custom(custom) => custom.config().clone(),
        }
    }
}

impl Display for PolicyOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.to_wire_value())
    }
}

fn classify_list(name: &OperationName, raw: &Value) -> Result<Vec<String>, OperationError> {
    match OperationConfig::classify(name, raw)? {
        OperationConfig::List(list) => Ok(list),
        other => Err(OperationError::TypeMismatch {
            operation: name.clone(),
            expected: "a string list",
            found: other.kind_name(),
        }),
    }
}

fn list_expected(operation: OperationName, found: &Value) -> OperationError {
    OperationError::Violation {
        operation,
        reason: format!("expected a string list, found {}", json_type_name(found)),
    }
}

/// Elements of `left` also present in `right`, in `left` order.
fn intersection(left: &[String], right: &[String]) -> Vec<String> {
    left.iter()
        .filter(|item| right.iter().any(|other| other == *item))
        .cloned()
        .collect()
}

/// Elements of `left` followed by unseen elements of `right`, duplicate-free.
fn union(left: &[String], right: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(left.len() + right.len());
    for item in left.iter().chain(right) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod operation_merge_tests {
    use super::*;

    fn subset(values: &[&str]) -> PolicyOperation {
        PolicyOperation::subset_of(values.iter().copied())
    }

    macro_rules! merge_success_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (left, right, expected) = $value;
                assert_eq!(left.merge(&right).unwrap(), expected);
                // merge is commutative up to element order; for these inputs
                // the order matches as well
                assert_eq!(right.merge(&left).unwrap(), expected);
            }
        )*
        }
    }

    merge_success_tests! {
        subset_of_intersects: (
            subset(&["openid", "email", "profile"]),
            subset(&["openid", "email", "phone"]),
            subset(&["openid", "email"])
        ),
        subset_of_empty_intersection_is_allowed: (
            subset(&["a"]),
            subset(&["b"]),
            subset(&[])
        ),
        one_of_intersects: (
            PolicyOperation::one_of(["RS256", "ES256", "HS256"]),
            PolicyOperation::one_of(["RS256", "ES256"]),
            PolicyOperation::one_of(["RS256", "ES256"])
        ),
        essential_is_sticky: (
            PolicyOperation::essential(false),
            PolicyOperation::essential(true),
            PolicyOperation::essential(true)
        ),
        essential_false_stays_false: (
            PolicyOperation::essential(false),
            PolicyOperation::essential(false),
            PolicyOperation::essential(false)
        ),
    }

    #[test]
    fn test_superset_of_merges_to_union() {
        let left = PolicyOperation::superset_of(["openid"]);
        let right = PolicyOperation::superset_of(["email", "openid"]);

        let merged = left.merge(&right).unwrap();
        assert_eq!(merged, PolicyOperation::superset_of(["openid", "email"]));
    }

    #[test]
    fn test_add_merges_to_union() {
        let left = PolicyOperation::add(["support@a.example"]);
        let right = PolicyOperation::add(["support@b.example", "support@a.example"]);

        let merged = left.merge(&right).unwrap();
        assert_eq!(
            merged,
            PolicyOperation::add(["support@a.example", "support@b.example"])
        );
    }

    #[test]
    fn test_subset_of_merge_is_idempotent() {
        let operation = subset(&["openid", "email"]);
        assert_eq!(operation.merge(&operation).unwrap(), operation);
    }

    #[test]
    fn test_value_merge_equal() {
        let left = PolicyOperation::value(OperationConfig::Text("web".into())).unwrap();
        let right = PolicyOperation::value(OperationConfig::Text("web".into())).unwrap();

        assert_eq!(left.merge(&right).unwrap(), left);
    }

    #[test]
    fn test_value_merge_mismatch_is_violation() {
        let left = PolicyOperation::value(OperationConfig::Text("web".into())).unwrap();
        let right = PolicyOperation::value(OperationConfig::Text("native".into())).unwrap();

        assert!(matches!(
            left.merge(&right).unwrap_err(),
            OperationError::Violation { operation, .. } if operation == OperationName::VALUE
        ));
    }

    #[test]
    fn test_one_of_empty_intersection_is_violation() {
        let left = PolicyOperation::one_of(["RS256"]);
        let right = PolicyOperation::one_of(["ES256"]);

        assert!(matches!(
            left.merge(&right).unwrap_err(),
            OperationError::Violation { operation, .. } if operation == OperationName::ONE_OF
        ));
    }

    #[test]
    fn test_default_merge_mismatch_is_violation() {
        let left = PolicyOperation::default_value(OperationConfig::Text("a".into())).unwrap();
        let right = PolicyOperation::default_value(OperationConfig::Text("b".into())).unwrap();

        assert!(matches!(
            left.merge(&right).unwrap_err(),
            OperationError::Violation { operation, .. } if operation == OperationName::DEFAULT
        ));
    }

    #[test]
    fn test_variant_mismatch_is_merge_mismatch() {
        let left = subset(&["openid"]);
        let right = PolicyOperation::one_of(["openid"]);

        assert_eq!(
            left.merge(&right).unwrap_err(),
            OperationError::MergeMismatch {
                left: OperationName::SUBSET_OF,
                right: OperationName::ONE_OF,
            }
        );
    }
}
