//! Error types for filter parsing, filter evaluation and PATCH conversion.
//!
//! Each stage of the engine reports its own error kind so callers can tell a
//! malformed filter apart from an illegal comparison or an unusable PATCH path.
//! None of these are ever coerced into a "no match" result.

use crate::filter::{CompareOperator, ValueType};

/// Malformed SCIM filter text.
///
/// Carries the byte offset where parsing failed and the fragment of input
/// starting at that offset, so the caller can point at the offending text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid filter at position {position} near '{fragment}': {message}")]
pub struct ParseError {
    /// What went wrong
    pub message: String,
    /// Byte offset into the filter text
    pub position: usize,
    /// The offending input fragment
    pub fragment: String,
}

/// Errors raised while parsing or evaluating a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The filter text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A structurally valid expression pairs an operator with a value type
    /// that does not support it (for example `gt` on a boolean)
    #[error(
        "Invalid filter expression: operator '{operator}' cannot be applied to {value_type} value of '{attribute}'"
    )]
    InvalidFilterExpression {
        attribute: String,
        operator: CompareOperator,
        value_type: ValueType,
    },
}

/// Errors raised while converting SCIM PATCH operations into JSON Patch.
///
/// A conversion either succeeds for the whole batch or fails with one of these;
/// no partial output is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// The path does not match any recognised SCIM path grammar
    #[error("Malformed PATCH path '{path}': {reason}")]
    MalformedPatchPath { path: String, reason: String },

    /// The `op` member is not add, remove or replace
    #[error("Unsupported PATCH operation: {op}")]
    UnsupportedOperation { op: String },

    /// An add or replace operation arrived without a value
    #[error("PATCH operation '{op}' requires a value")]
    MissingValue { op: String },

    /// The PATCH request envelope is not a valid PatchOp message
    #[error("Invalid PATCH request: {message}")]
    InvalidPatchRequest { message: String },

    /// A filter embedded in a path failed to evaluate
    #[error("PATCH filter error: {0}")]
    Filter(#[from] FilterError),

    /// A JSON Patch operation could not be applied to a document
    #[error("Cannot apply JSON Patch at '{path}': {message}")]
    Application { path: String, message: String },
}

/// Top-level error type covering every engine stage.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Filter parsing or evaluation errors
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// PATCH conversion or application errors
    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for ScimError {
    fn from(error: ParseError) -> Self {
        Self::Filter(FilterError::Parse(error))
    }
}

impl ParseError {
    /// Create a parse error for the input fragment starting at `position`.
    ///
    /// The fragment is truncated to a short window so long filters stay readable.
    pub fn new(message: impl Into<String>, input: &str, position: usize) -> Self {
        let position = position.min(input.len());
        let fragment: String = input
            .get(position..)
            .unwrap_or_default()
            .chars()
            .take(24)
            .collect();
        Self {
            message: message.into(),
            position,
            fragment,
        }
    }
}

impl FilterError {
    /// Create an illegal operator/value-type pairing error
    pub fn invalid_expression(
        attribute: impl Into<String>,
        operator: CompareOperator,
        value_type: ValueType,
    ) -> Self {
        Self::InvalidFilterExpression {
            attribute: attribute.into(),
            operator,
            value_type,
        }
    }
}

impl PatchError {
    /// Create a malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPatchPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an application error
    pub fn application(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Application {
            path: path.into(),
            message: message.into(),
        }
    }
}

// Result type aliases for convenience
pub type ParseResult<T> = Result<T, ParseError>;
pub type FilterResult<T> = Result<T, FilterError>;
pub type PatchResult<T> = Result<T, PatchError>;
pub type ScimResult<T> = Result<T, ScimError>;
