//! Engine configuration shared by the filter matcher and the PATCH converter.

use crate::filter::attribute_path::{CORE_GROUP_SCHEMA, CORE_USER_SCHEMA};
use serde_json::{Map, Value};

/// Configuration for attribute resolution.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_core_schema("urn:example:schemas:core:1.0:Device")
///     .with_case_exact_attributes(true);
/// assert!(config.is_core_schema("urn:example:schemas:core:1.0:Device"));
/// assert!(config.case_exact_attributes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Schema URNs whose attributes live at the top level of a resource.
    ///
    /// Paths qualified by one of these resolve against the document root and
    /// lose their URN when converted to a JSON Pointer. Any other URN names an
    /// extension object keyed by the URN itself.
    pub core_schemas: Vec<String>,

    /// Match attribute names exactly. When false (the default, per RFC 7643
    /// section 2.1) an exact key is preferred and a case-insensitive match is
    /// used as fallback.
    pub case_exact_attributes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            core_schemas: vec![CORE_USER_SCHEMA.to_string(), CORE_GROUP_SCHEMA.to_string()],
            case_exact_attributes: false,
        }
    }
}

impl EngineConfig {
    /// Register an additional core schema URN
    pub fn with_core_schema(mut self, urn: impl Into<String>) -> Self {
        self.core_schemas.push(urn.into());
        self
    }

    pub fn with_case_exact_attributes(mut self, case_exact: bool) -> Self {
        self.case_exact_attributes = case_exact;
        self
    }

    /// Whether `urn` names a core schema. URNs compare case-insensitively.
    pub fn is_core_schema(&self, urn: &str) -> bool {
        self.core_schemas
            .iter()
            .any(|core| core.eq_ignore_ascii_case(urn))
    }

    /// Find the key of `object` naming `attribute`, honouring
    /// [`case_exact_attributes`](Self::case_exact_attributes).
    pub(crate) fn find_key<'a>(
        &self,
        object: &'a Map<String, Value>,
        attribute: &str,
    ) -> Option<&'a String> {
        if let Some((key, _)) = object.get_key_value(attribute) {
            return Some(key);
        }
        if self.case_exact_attributes {
            return None;
        }
        object.keys().find(|key| key.eq_ignore_ascii_case(attribute))
    }
}
