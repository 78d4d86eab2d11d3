//! SCIM PATCH and JSON Patch operation types.
//!
//! [`ScimPatchOperation`] is the RFC 7644 section 3.5.2 input shape, whose
//! paths may embed filters. [`JsonPatchOperation`] is the RFC 6902 output
//! shape, always addressed by a JSON Pointer.

use crate::error::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Message schema every SCIM PATCH request body declares
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// A PATCH operation name.
///
/// Parsing accepts any casing (`Add`, `ADD`, `add`); serialization is always
/// lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
        }
    }
}

impl FromStr for PatchOp {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(PatchOp::Add),
            "remove" => Ok(PatchOp::Remove),
            "replace" => Ok(PatchOp::Replace),
            _ => Err(PatchError::UnsupportedOperation { op: s.to_string() }),
        }
    }
}

impl TryFrom<String> for PatchOp {
    type Error = PatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a SCIM PATCH request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScimPatchOperation {
    pub op: PatchOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ScimPatchOperation {
    pub fn new(op: PatchOp, path: Option<&str>, value: Option<Value>) -> Self {
        Self {
            op,
            path: path.map(str::to_string),
            value,
        }
    }

    pub fn add(path: Option<&str>, value: Value) -> Self {
        Self::new(PatchOp::Add, path, Some(value))
    }

    pub fn remove(path: &str) -> Self {
        Self::new(PatchOp::Remove, Some(path), None)
    }

    pub fn replace(path: Option<&str>, value: Value) -> Self {
        Self::new(PatchOp::Replace, path, Some(value))
    }

    /// The value of an add or replace, which must be present.
    pub(crate) fn required_value(&self) -> PatchResult<&Value> {
        self.value.as_ref().ok_or_else(|| PatchError::MissingValue {
            op: self.op.to_string(),
        })
    }
}

/// A SCIM PATCH request body.
///
/// ```rust
/// use scim_filter_patch::patch::PatchRequest;
///
/// let request = PatchRequest::from_json(r#"{
///     "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
///     "Operations": [{"op": "Replace", "path": "active", "value": false}]
/// }"#).unwrap();
/// assert_eq!(request.operations.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Vec<ScimPatchOperation>,
}

impl PatchRequest {
    pub fn new(operations: Vec<ScimPatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations,
        }
    }

    /// Parse and validate a request from its JSON text.
    pub fn from_json(text: &str) -> PatchResult<Self> {
        let request: Self = serde_json::from_str(text).map_err(invalid_request)?;
        request.validate()?;
        Ok(request)
    }

    /// Parse and validate a request from a JSON value.
    pub fn from_value(value: Value) -> PatchResult<Self> {
        let request: Self = serde_json::from_value(value).map_err(invalid_request)?;
        request.validate()?;
        Ok(request)
    }

    /// Check the message schema.
    ///
    /// A request that lists schemas must include the PatchOp URN. Bodies with
    /// no `schemas` member at all are accepted.
    pub fn validate(&self) -> PatchResult<()> {
        if self.schemas.is_empty()
            || self
                .schemas
                .iter()
                .any(|schema| schema.eq_ignore_ascii_case(PATCH_OP_SCHEMA))
        {
            return Ok(());
        }
        Err(PatchError::InvalidPatchRequest {
            message: format!("schemas must contain '{}'", PATCH_OP_SCHEMA),
        })
    }
}

fn invalid_request(error: serde_json::Error) -> PatchError {
    PatchError::InvalidPatchRequest {
        message: error.to_string(),
    }
}

/// One RFC 6902 operation addressed by a JSON Pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl JsonPatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: Some(value),
        }
    }
}
