//! Operation name resolution and custom operation support.
//!
//! The seven standard operations are built in; anything else must be
//! registered as a [`CustomOperationHandler`] before a policy using it can be
//! parsed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::operation::{OperationError, OperationName, PolicyOperation};

/// Behavior of a non-standard policy operation.
///
/// A handler works on raw [`serde_json::Value`] configurations: `parse`
/// validates and normalizes the wire value, `merge` combines two
/// configurations of the same operation, and `apply` transforms a leaf
/// metadata value. Handlers are shared behind an [`Arc`] by every operation
/// instance parsed through them, so they must not carry mutable state.
pub trait CustomOperationHandler: fmt::Debug + Send + Sync {
    /// Validates the raw wire configuration and returns the value to store.
    fn parse(&self, name: &OperationName, raw: &Value) -> Result<Value, OperationError>;

    /// Merges two configurations of this operation into a new one.
    ///
    /// Implementations should be commutative and associative, like the
    /// standard operations, so the chain fold stays order-insensitive.
    fn merge(&self, name: &OperationName, left: &Value, right: &Value)
        -> Result<Value, OperationError>;

    /// Applies the configured constraint to the leaf's current value.
    fn apply(
        &self,
        name: &OperationName,
        config: &Value,
        value: Option<&Value>,
    ) -> Result<Option<Value>, OperationError>;
}

/// A configured instance of a registered non-standard operation.
#[derive(Debug, Clone)]
pub struct CustomOperation {
    name: OperationName,
    config: Value,
    handler: Arc<dyn CustomOperationHandler>,
}

impl CustomOperation {
    /// Returns the wire name of this operation.
    pub fn name(&self) -> &OperationName {
        &self.name
    }

    /// Returns the stored configuration value.
    pub fn config(&self) -> &Value {
        &self.config
    }

    pub(crate) fn merge(&self, other: &CustomOperation) -> Result<CustomOperation, OperationError> {
        let merged = self.handler.merge(&self.name, &self.config, &other.config)?;
        Ok(CustomOperation {
            name: self.name.clone(),
            config: merged,
            handler: Arc::clone(&self.handler),
        })
    }

    pub(crate) fn apply(&self, value: Option<&Value>) -> Result<Option<Value>, OperationError> {
        self.handler.apply(&self.name, &self.config, value)
    }
}

// Equality on name + configuration; the handler is behavior, not data.
impl PartialEq for CustomOperation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.config == other.config
    }
}

/// Resolves operation wire names to parsed [`PolicyOperation`] instances.
///
/// Standard names always resolve to the built-in variants; custom names
/// resolve through registered handlers. Registering a handler under a
/// standard name has no effect, the built-in variant wins.
///
/// # Examples
///
/// ```
/// use fedpolicy::{MetadataPolicy, OperationRegistry};
///
/// let registry = OperationRegistry::new();
/// let policy = MetadataPolicy::parse_json_with(
///     r#"{"scopes": {"subset_of": ["openid", "email"]}}"#,
///     &registry,
/// )?;
/// assert_eq!(policy.len(), 1);
/// # Ok::<(), fedpolicy::PolicyError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    custom: HashMap<OperationName, Arc<dyn CustomOperationHandler>>,
}

impl OperationRegistry {
    /// Creates a registry with only the standard operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a non-standard operation name.
    pub fn register(
        &mut self,
        name: impl Into<OperationName>,
        handler: Arc<dyn CustomOperationHandler>,
    ) {
        self.custom.insert(name.into(), handler);
    }

    /// Returns the handler registered for a name, if any.
    pub fn handler(&self, name: &OperationName) -> Option<&Arc<dyn CustomOperationHandler>> {
        self.custom.get(name)
    }

    /// Parses one operation from its wire name and raw configuration value.
    ///
    /// # Errors
    ///
    /// [`OperationError::Unsupported`] when the name is neither standard nor
    /// registered; otherwise whatever the variant constructor or handler
    /// reports for the configuration.
    pub fn parse_operation(
        &self,
        name: &OperationName,
        raw: &Value,
    ) -> Result<PolicyOperation, OperationError> {
        if let Some(operation) = PolicyOperation::parse_standard(name, raw)? {
            return Ok(operation);
        }
        match self.custom.get(name) {
            Some(handler) => {
                let config = handler.parse(name, raw)?;
                Ok(PolicyOperation::Custom(CustomOperation {
                    name: name.clone(),
                    config,
                    handler: Arc::clone(handler),
                }))
            }
            None => Err(OperationError::Unsupported {
                operation: name.clone(),
            }),
        }
    }
}

/// Shared registry holding only the standard operations, backing the
/// convenience `MetadataPolicy::parse*` constructors.
pub(crate) fn standard_registry() -> &'static OperationRegistry {
    static STANDARD: Lazy<OperationRegistry> = Lazy::new(OperationRegistry::new);
    &STANDARD
}
