//! Document- and chain-level error types for the policy engine.

use thiserror::Error;

use crate::operation::{OperationError, OperationName};

/// An error surfaced by parsing, merging or applying metadata policies.
///
/// Every variant names the metadata parameter it concerns, and fold failures
/// additionally carry the 0-based index of the authority whose policy caused
/// the conflict, so the federation-resolution layer can report exactly where
/// a trust chain broke down.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PolicyError {
    /// The policy document itself is not well formed (not valid JSON, or not
    /// a JSON object).
    #[error("malformed policy document: {reason}")]
    ParseDocument {
        /// Human-readable cause.
        reason: String,
    },

    /// A parameter's policy entry has the wrong wire shape, e.g. the entry is
    /// not a JSON object or an operation configuration failed to parse.
    #[error("malformed policy for parameter \"{parameter}\": {reason}")]
    Parse {
        /// The offending metadata parameter.
        parameter: String,
        /// Human-readable cause.
        reason: String,
    },

    /// An operation name with no built-in variant and no registered handler.
    #[error("unsupported policy operation \"{operation}\" for parameter \"{parameter}\"")]
    UnsupportedOperation {
        /// The offending metadata parameter.
        parameter: String,
        /// The unknown operation name.
        operation: OperationName,
    },

    /// A parameter declares (or a merge produced) an internally inconsistent
    /// set of operations.
    #[error(
        "operations \"{first}\" and \"{second}\" cannot be combined for parameter \"{parameter}\""
    )]
    InvalidCombination {
        /// The offending metadata parameter.
        parameter: String,
        /// One of the conflicting operation names.
        first: OperationName,
        /// The other conflicting operation name.
        second: OperationName,
    },

    /// A semantic conflict between authorities during a merge, or a
    /// constraint the leaf metadata failed at apply time.
    #[error("policy violation for parameter \"{parameter}\": {source}")]
    Violation {
        /// The offending metadata parameter.
        parameter: String,
        /// The underlying operation conflict.
        source: OperationError,
    },

    /// A chain fold failure, wrapping the underlying error with the index of
    /// the authority whose policy conflicted.
    #[error("policy of chain authority {chain_index} conflicts for parameter \"{parameter}\": {source}")]
    ChainViolation {
        /// The offending metadata parameter.
        parameter: String,
        /// 0-based index into the folded policy sequence (0 = closest to the
        /// trust anchor).
        chain_index: usize,
        /// The underlying failure.
        source: Box<PolicyError>,
    },

    /// Engine misuse, e.g. merging two different operation variants. Never
    /// produced by well-formed input.
    #[error("illegal engine state: {0}")]
    IllegalState(String),
}

impl PolicyError {
    /// Wraps an operation-level error with the metadata parameter it
    /// occurred on.
    pub(crate) fn from_operation(parameter: &str, error: OperationError) -> Self {
        match error {
            OperationError::Unsupported { operation } => PolicyError::UnsupportedOperation {
                parameter: parameter.to_owned(),
                operation,
            },
            OperationError::MergeMismatch { left, right } => PolicyError::IllegalState(format!(
                "attempted to merge \"{left}\" with \"{right}\" for parameter \"{parameter}\""
            )),
            error @ (OperationError::TypeMismatch { .. } | OperationError::Parse { .. }) => {
                PolicyError::Parse {
                    parameter: parameter.to_owned(),
                    reason: error.to_string(),
                }
            }
            violation @ OperationError::Violation { .. } => PolicyError::Violation {
                parameter: parameter.to_owned(),
                source: violation,
            },
        }
    }

    /// Annotates a fold failure with the authority index that caused it.
    pub(crate) fn at_chain_index(self, parameter: &str, chain_index: usize) -> Self {
        PolicyError::ChainViolation {
            parameter: parameter.to_owned(),
            chain_index,
            source: Box::new(self),
        }
    }
}
