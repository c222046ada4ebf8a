//! Metadata policy documents: per-parameter entries and the full
//! parameter-to-entry mapping declared by one authority.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::PolicyError;
use crate::operation::combination;
use crate::operation::registry::{standard_registry, OperationRegistry};
use crate::operation::{OperationConfig, OperationName, PolicyOperation};

mod chain;

/// The policy for one metadata parameter: the parameter name plus its
/// ordered list of operations.
///
/// Operation order is significant for [`apply`](Self::apply) (operations run
/// in declared order, each consuming the previous result); combination
/// validation looks at the set as a whole. An entry is validated on
/// construction and every constructor of a modified entry re-validates, so a
/// held entry is always internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataPolicyEntry {
    parameter: String,
    operations: Vec<PolicyOperation>,
}

impl MetadataPolicyEntry {
    /// Creates an entry from a parameter name and its ordered operations.
    ///
    /// # Errors
    ///
    /// [`PolicyError::InvalidCombination`] if the operation set is
    /// internally inconsistent (e.g. `value` next to `default`).
    ///
    /// # Examples
    ///
    /// ```
    /// use fedpolicy::{MetadataPolicyEntry, PolicyOperation};
    ///
    /// let entry = MetadataPolicyEntry::new(
    ///     "scopes",
    ///     vec![
    ///         PolicyOperation::subset_of(["openid", "email"]),
    ///         PolicyOperation::essential(true),
    ///     ],
    /// )?;
    /// assert_eq!(entry.parameter(), "scopes");
    /// # Ok::<(), fedpolicy::PolicyError>(())
    /// ```
    pub fn new(
        parameter: impl Into<String>,
        operations: Vec<PolicyOperation>,
    ) -> Result<Self, PolicyError> {
        let parameter = parameter.into();
        combination::validate(&parameter, &operations)?;
        Ok(Self {
            parameter,
            operations,
        })
    }

    /// Returns the metadata parameter name.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Returns the ordered operations of this entry.
    pub fn operations(&self) -> &[PolicyOperation] {
        &self.operations
    }

    /// Returns the operation with the given name, if declared.
    pub fn get(&self, name: &OperationName) -> Option<&PolicyOperation> {
        self.operations.iter().find(|op| op.name() == *name)
    }

    /// Parses an entry from the JSON object under a parameter name, with
    /// operation names resolved through the given registry.
    pub(crate) fn parse(
        parameter: &str,
        entry_spec: &Map<String, Value>,
        registry: &OperationRegistry,
    ) -> Result<Self, PolicyError> {
        let mut operations = Vec::with_capacity(entry_spec.len());
        for (operation_name, raw) in entry_spec {
            let name = OperationName::from(operation_name.as_str());
            let operation = registry
                .parse_operation(&name, raw)
                .map_err(|error| PolicyError::from_operation(parameter, error))?;
            operations.push(operation);
        }
        Self::new(parameter, operations)
    }

    /// Returns the JSON object representation of this entry, one key/value
    /// pair per operation.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut object = Map::new();
        for operation in &self.operations {
            object.insert(operation.name().to_string(), operation.to_wire_value());
        }
        object
    }

    /// Merges this entry with another authority's entry for the same
    /// parameter, producing a new, re-validated entry.
    ///
    /// Operations present on both sides merge pairwise; an operation present
    /// on one side only passes through unchanged. A `value` surviving next
    /// to a `one_of` from a different chain level is resolved by subsumption
    /// before re-validation: the value must lie within the candidate set,
    /// and the `one_of` is then dropped.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Violation`] on a semantic conflict,
    /// [`PolicyError::InvalidCombination`] if the merged set is
    /// inconsistent, and [`PolicyError::IllegalState`] if the entries name
    /// different parameters.
    pub fn merge(&self, other: &MetadataPolicyEntry) -> Result<MetadataPolicyEntry, PolicyError> {
        if self.parameter != other.parameter {
            return Err(PolicyError::IllegalState(format!(
                "cannot merge entry for \"{}\" with entry for \"{}\"",
                self.parameter, other.parameter
            )));
        }

        let mut merged: Vec<PolicyOperation> = Vec::with_capacity(self.operations.len());
        for operation in &self.operations {
            match other.get(&operation.name()) {
                Some(counterpart) => merged.push(
                    operation
                        .merge(counterpart)
                        .map_err(|error| PolicyError::from_operation(&self.parameter, error))?,
                ),
                None => merged.push(operation.clone()),
            }
        }
        for operation in &other.operations {
            if self.get(&operation.name()).is_none() {
                merged.push(operation.clone());
            }
        }

        let merged = resolve_value_subsumption(&self.parameter, merged)?;
        Self::new(self.parameter.clone(), merged)
    }

    /// Applies this entry's operations, in declared order, to the leaf's
    /// current value for the parameter. `None` means the parameter is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use fedpolicy::{MetadataPolicyEntry, PolicyOperation};
    /// use serde_json::json;
    ///
    /// let entry = MetadataPolicyEntry::new(
    ///     "scopes",
    ///     vec![PolicyOperation::subset_of(["openid", "email"])],
    /// )?;
    ///
    /// let result = entry.apply(Some(&json!(["openid", "phone"])))?;
    /// assert_eq!(result, Some(json!(["openid"])));
    /// # Ok::<(), fedpolicy::PolicyError>(())
    /// ```
    pub fn apply(&self, value: Option<&Value>) -> Result<Option<Value>, PolicyError> {
        let mut current = value.cloned();
        for operation in &self.operations {
            current = operation
                .apply(current.as_ref())
                .map_err(|error| PolicyError::from_operation(&self.parameter, error))?;
        }
        Ok(current)
    }
}

/// Cross-level resolution for `value` + `one_of` (spec'd as: a subordinate's
/// fixed value must lie within the superior's candidate set; the `one_of` is
/// then subsumed by the `value`). Any other operation surviving next to
/// `value` is left for combination validation to reject.
fn resolve_value_subsumption(
    parameter: &str,
    mut operations: Vec<PolicyOperation>,
) -> Result<Vec<PolicyOperation>, PolicyError> {
    let fixed = operations.iter().find_map(|op| match op {
        PolicyOperation::Value(config) => Some(config.clone()),
        _ => None,
    });
    let Some(fixed) = fixed else {
        return Ok(operations);
    };
    let Some(position) = operations
        .iter()
        .position(|op| matches!(op, PolicyOperation::OneOf(_)))
    else {
        return Ok(operations);
    };

    let within = match (&operations[position], &fixed) {
        (PolicyOperation::OneOf(candidates), OperationConfig::Text(text)) => {
            candidates.iter().any(|candidate| candidate == text)
        }
        _ => false,
    };
    if !within {
        return Err(PolicyError::Violation {
            parameter: parameter.to_owned(),
            source: crate::operation::OperationError::Violation {
                operation: OperationName::VALUE,
                reason: "fixed value is outside the one_of candidate set".to_owned(),
            },
        });
    }
    operations.remove(position);
    Ok(operations)
}

/// The full metadata policy declared by one authority: a mapping from
/// parameter name to [`MetadataPolicyEntry`], insertion order preserved.
///
/// # Examples
///
/// ```
/// use fedpolicy::MetadataPolicy;
///
/// let policy: MetadataPolicy = r#"{
///     "scopes": {
///         "subset_of": ["openid", "eduperson", "phone"],
///         "superset_of": ["openid"],
///         "default": ["openid", "eduperson"]
///     },
///     "id_token_signed_response_alg": {"one_of": ["ES256", "ES384", "ES512"]},
///     "contacts": {"add": "helpdesk@federation.example.org"},
///     "application_type": {"value": "web"}
/// }"#
/// .parse()?;
///
/// assert_eq!(policy.len(), 4);
/// assert!(policy.get("scopes").is_some());
/// # Ok::<(), fedpolicy::PolicyError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataPolicy {
    entries: IndexMap<String, MetadataPolicyEntry>,
}

impl MetadataPolicy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous entry for the same
    /// parameter (the original position is kept on replacement).
    pub fn put(&mut self, entry: MetadataPolicyEntry) {
        self.entries.insert(entry.parameter.clone(), entry);
    }

    /// Inserts an entry built from a parameter name and its operations.
    ///
    /// # Errors
    ///
    /// [`PolicyError::InvalidCombination`] if the operation set is
    /// inconsistent.
    pub fn put_operations(
        &mut self,
        parameter: impl Into<String>,
        operations: Vec<PolicyOperation>,
    ) -> Result<(), PolicyError> {
        self.put(MetadataPolicyEntry::new(parameter, operations)?);
        Ok(())
    }

    /// Returns the entry for a parameter, if present.
    pub fn get(&self, parameter: &str) -> Option<&MetadataPolicyEntry> {
        self.entries.get(parameter)
    }

    /// Removes and returns the entry for a parameter, preserving the order
    /// of the remaining entries.
    pub fn remove(&mut self, parameter: &str) -> Option<MetadataPolicyEntry> {
        self.entries.shift_remove(parameter)
    }

    /// Returns an iterator over the entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &MetadataPolicyEntry> {
        self.entries.values()
    }

    /// Returns the number of parameters with a policy entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the policy has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a policy from an already-decoded JSON object, using only the
    /// standard operations.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Parse`] for wire-shape problems,
    /// [`PolicyError::UnsupportedOperation`] for unknown operation names and
    /// [`PolicyError::InvalidCombination`] for inconsistent entries.
    pub fn parse_object(policy_spec: &Map<String, Value>) -> Result<Self, PolicyError> {
        Self::parse_object_with(policy_spec, standard_registry())
    }

    /// Parses a policy from an already-decoded JSON object, resolving
    /// non-standard operation names through the given registry.
    pub fn parse_object_with(
        policy_spec: &Map<String, Value>,
        registry: &OperationRegistry,
    ) -> Result<Self, PolicyError> {
        let mut policy = MetadataPolicy::new();
        for (parameter, raw) in policy_spec {
            let entry_spec = raw.as_object().ok_or_else(|| PolicyError::Parse {
                parameter: parameter.clone(),
                reason: format!(
                    "policy entry must be a JSON object, found {}",
                    crate::operation::json_type_name(raw)
                ),
            })?;
            policy.put(MetadataPolicyEntry::parse(parameter, entry_spec, registry)?);
        }
        Ok(policy)
    }

    /// Parses a policy from its JSON text, using only the standard
    /// operations. Also available through [`FromStr`].
    pub fn parse_json(policy_spec: &str) -> Result<Self, PolicyError> {
        Self::parse_json_with(policy_spec, standard_registry())
    }

    /// Parses a policy from its JSON text, resolving non-standard operation
    /// names through the given registry.
    pub fn parse_json_with(
        policy_spec: &str,
        registry: &OperationRegistry,
    ) -> Result<Self, PolicyError> {
        let value: Value =
            serde_json::from_str(policy_spec).map_err(|error| PolicyError::ParseDocument {
                reason: error.to_string(),
            })?;
        let object = value.as_object().ok_or_else(|| PolicyError::ParseDocument {
            reason: "policy must be a JSON object".to_owned(),
        })?;
        Self::parse_object_with(object, registry)
    }

    /// Returns the JSON object representation of this policy, the structural
    /// inverse of parsing.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut object = Map::new();
        for entry in self.entries() {
            object.insert(
                entry.parameter().to_owned(),
                Value::Object(entry.to_json_object()),
            );
        }
        object
    }
}

impl Display for MetadataPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text =
            serde_json::to_string(&Value::Object(self.to_json_object())).map_err(|_| fmt::Error)?;
        write!(f, "{text}")
    }
}

impl FromStr for MetadataPolicy {
    type Err = PolicyError;

    fn from_str(policy_spec: &str) -> Result<Self, Self::Err> {
        Self::parse_json(policy_spec)
    }
}

impl Extend<MetadataPolicyEntry> for MetadataPolicy {
    fn extend<T: IntoIterator<Item = MetadataPolicyEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.put(entry);
        }
    }
}

impl FromIterator<MetadataPolicyEntry> for MetadataPolicy {
    fn from_iter<T: IntoIterator<Item = MetadataPolicyEntry>>(iter: T) -> Self {
        let mut policy = Self::new();
        policy.extend(iter);
        policy
    }
}

impl Serialize for MetadataPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Value::Object(self.to_json_object()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetadataPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| D::Error::custom("policy must be a JSON object"))?;
        Self::parse_object(object).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod metadata_policy_entry_tests {
    use super::*;
    use crate::operation::OperationError;
    use serde_json::json;

    fn entry(parameter: &str, spec: Value) -> Result<MetadataPolicyEntry, PolicyError> {
        MetadataPolicyEntry::parse(
            parameter,
            spec.as_object().unwrap(),
            standard_registry(),
        )
    }

    #[test]
    fn test_parse_preserves_operation_order() {
        let entry = entry(
            "scopes",
            json!({"subset_of": ["openid", "email"], "default": ["openid"], "essential": true}),
        )
        .unwrap();

        let names: Vec<String> = entry
            .operations()
            .iter()
            .map(|op| op.name().to_string())
            .collect();
        assert_eq!(names, ["subset_of", "default", "essential"]);
    }

    #[test]
    fn test_parse_rejects_invalid_combination() {
        let error = entry("scopes", json!({"value": "x", "default": "y"})).unwrap_err();

        assert_eq!(
            error,
            PolicyError::InvalidCombination {
                parameter: "scopes".to_owned(),
                first: OperationName::VALUE,
                second: OperationName::DEFAULT,
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_operation() {
        let error = entry("scopes", json!({"regexp": "^openid"})).unwrap_err();

        assert!(matches!(
            error,
            PolicyError::UnsupportedOperation { parameter, operation }
                if parameter == "scopes" && operation.as_str() == "regexp"
        ));
    }

    #[test]
    fn test_parse_rejects_bad_list_element() {
        let error = entry("scopes", json!({"subset_of": ["openid", 1]})).unwrap_err();

        assert!(matches!(error, PolicyError::Parse { parameter, .. } if parameter == "scopes"));
    }

    #[test]
    fn test_apply_runs_operations_in_declared_order() {
        // subset_of first narrows, then default fills if the result became
        // empty; reversing the order would leave the default in place
        let entry = entry(
            "scopes",
            json!({"subset_of": ["openid"], "default": ["openid"]}),
        )
        .unwrap();

        let narrowed = entry.apply(Some(&json!(["email", "phone"]))).unwrap();
        assert_eq!(narrowed, Some(json!(["openid"])));
    }

    #[test]
    fn test_merge_passes_one_sided_operations_through() {
        let left = entry("scopes", json!({"subset_of": ["openid", "email"]})).unwrap();
        let right = entry(
            "scopes",
            json!({"subset_of": ["openid"], "essential": true}),
        )
        .unwrap();

        let merged = left.merge(&right).unwrap();
        assert_eq!(
            merged.to_json_object(),
            json!({"subset_of": ["openid"], "essential": true})
                .as_object()
                .unwrap()
                .clone()
        );
    }

    #[test]
    fn test_merge_different_parameters_is_illegal_state() {
        let left = entry("scopes", json!({"essential": true})).unwrap();
        let right = entry("contacts", json!({"essential": true})).unwrap();

        assert!(matches!(
            left.merge(&right).unwrap_err(),
            PolicyError::IllegalState(_)
        ));
    }

    #[test]
    fn test_merge_value_within_one_of_subsumes() {
        let superior = entry("alg", json!({"one_of": ["RS256", "ES256"]})).unwrap();
        let subordinate = entry("alg", json!({"value": "ES256"})).unwrap();

        let merged = superior.merge(&subordinate).unwrap();
        assert_eq!(
            merged.to_json_object(),
            json!({"value": "ES256"}).as_object().unwrap().clone()
        );
    }

    #[test]
    fn test_merge_value_outside_one_of_is_violation() {
        let superior = entry("alg", json!({"one_of": ["RS256", "ES256"]})).unwrap();
        let subordinate = entry("alg", json!({"value": "HS256"})).unwrap();

        assert!(matches!(
            superior.merge(&subordinate).unwrap_err(),
            PolicyError::Violation { parameter, source: OperationError::Violation { .. } }
                if parameter == "alg"
        ));
    }

    #[test]
    fn test_merge_value_with_subset_of_is_invalid_combination() {
        let superior = entry("scopes", json!({"subset_of": ["openid"]})).unwrap();
        let subordinate = entry("scopes", json!({"value": ["openid"]})).unwrap();

        assert!(matches!(
            superior.merge(&subordinate).unwrap_err(),
            PolicyError::InvalidCombination { .. }
        ));
    }
}

#[cfg(test)]
mod metadata_policy_tests {
    use super::*;
    use serde_json::json;

    const POLICY_JSON: &str = r#"{
        "scopes": {
            "subset_of": ["openid", "eduperson", "phone"],
            "superset_of": ["openid"],
            "default": ["openid", "eduperson"]
        },
        "id_token_signed_response_alg": {"one_of": ["ES256", "ES384", "ES512"]},
        "contacts": {"add": "helpdesk@federation.example.org"},
        "application_type": {"value": "web"}
    }"#;

    #[test]
    fn test_parse_full_document() {
        let policy: MetadataPolicy = POLICY_JSON.parse().unwrap();

        assert_eq!(policy.len(), 4);
        let parameters: Vec<&str> = policy.entries().map(MetadataPolicyEntry::parameter).collect();
        assert_eq!(
            parameters,
            [
                "scopes",
                "id_token_signed_response_alg",
                "contacts",
                "application_type"
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let policy: MetadataPolicy = POLICY_JSON.parse().unwrap();
        let reparsed = MetadataPolicy::parse_object(&policy.to_json_object()).unwrap();

        assert_eq!(reparsed, policy);
    }

    #[test]
    fn test_display_round_trip() {
        let policy: MetadataPolicy = POLICY_JSON.parse().unwrap();
        let reparsed: MetadataPolicy = policy.to_string().parse().unwrap();

        assert_eq!(reparsed, policy);
    }

    #[test]
    fn test_serde_round_trip() {
        let policy: MetadataPolicy = POLICY_JSON.parse().unwrap();

        let text = serde_json::to_string(&policy).unwrap();
        let reparsed: MetadataPolicy = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, policy);
    }

    #[test]
    fn test_parse_rejects_non_object_document() {
        let error = MetadataPolicy::parse_json(r#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(error, PolicyError::ParseDocument { .. }));
    }

    #[test]
    fn test_parse_rejects_non_object_entry() {
        let error = MetadataPolicy::parse_json(r#"{"scopes": ["openid"]}"#).unwrap_err();
        assert!(matches!(error, PolicyError::Parse { parameter, .. } if parameter == "scopes"));
    }

    #[test]
    fn test_put_get_remove() {
        let mut policy = MetadataPolicy::new();
        policy
            .put_operations("scopes", vec![PolicyOperation::subset_of(["openid"])])
            .unwrap();
        policy
            .put_operations("contacts", vec![PolicyOperation::add(["a@example.org"])])
            .unwrap();

        assert_eq!(policy.len(), 2);
        assert!(policy.get("scopes").is_some());

        let removed = policy.remove("scopes").unwrap();
        assert_eq!(removed.parameter(), "scopes");
        assert!(policy.get("scopes").is_none());
        assert_eq!(policy.len(), 1);
        assert!(policy.remove("scopes").is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let mut policy = MetadataPolicy::new();
        policy
            .put_operations("scopes", vec![PolicyOperation::subset_of(["openid"])])
            .unwrap();
        policy
            .put_operations("scopes", vec![PolicyOperation::subset_of(["email"])])
            .unwrap();

        assert_eq!(policy.len(), 1);
        assert_eq!(
            policy.get("scopes").unwrap().to_json_object(),
            json!({"subset_of": ["email"]}).as_object().unwrap().clone()
        );
    }

    #[test]
    fn test_put_operations_validates_combination() {
        let mut policy = MetadataPolicy::new();
        let error = policy
            .put_operations(
                "scopes",
                vec![
                    PolicyOperation::value(OperationConfig::Text("x".into())).unwrap(),
                    PolicyOperation::essential(true),
                ],
            )
            .unwrap_err();

        assert!(matches!(error, PolicyError::InvalidCombination { .. }));
    }

    #[test]
    fn test_from_iterator() {
        let entries = vec![
            MetadataPolicyEntry::new("scopes", vec![PolicyOperation::subset_of(["openid"])])
                .unwrap(),
            MetadataPolicyEntry::new("contacts", vec![PolicyOperation::add(["a@example.org"])])
                .unwrap(),
        ];

        let policy: MetadataPolicy = entries.into_iter().collect();
        assert_eq!(policy.len(), 2);
    }
}
