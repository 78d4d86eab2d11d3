//! SCIM PATCH path classification and JSON Pointer construction.
//!
//! A PATCH path is either a plain attribute path (`name.givenName`,
//! `urn:...:enterprise:2.0:User:manager`) or an attribute carrying one
//! bracketed filter, optionally followed by a sub-attribute
//! (`emails[type eq "work"].value`). Classification is purely structural.

use crate::config::EngineConfig;
use crate::error::{PatchError, PatchResult};
use crate::filter::{AttributePath, Expression, parse};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FILTERED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\[\]]+)\[(.+)\](?:\.([^\[\]]+))?$").expect("valid regex")
});

/// A classified PATCH path.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchPath {
    /// A path without a filter clause
    Attribute(AttributePath),
    /// `attribute[filter].sub_attribute`
    Filtered {
        attribute: AttributePath,
        filter: Expression,
        sub_attribute: Option<AttributePath>,
    },
}

impl PatchPath {
    /// Classify and parse PATCH path text.
    ///
    /// # Errors
    ///
    /// [`PatchError::MalformedPatchPath`] when the text fits neither shape, an
    /// attribute name is invalid, or the bracketed filter does not parse.
    pub fn parse(text: &str) -> PatchResult<Self> {
        if let Some(captures) = FILTERED_PATH.captures(text) {
            let attribute = parse_attribute(text, &captures[1])?;
            let filter = parse(&captures[2])
                .map_err(|error| PatchError::malformed_path(text, error.to_string()))?;
            let sub_attribute = match captures.get(3) {
                Some(sub) => {
                    let sub = parse_attribute(text, sub.as_str())?;
                    if sub.schema().is_some() {
                        return Err(PatchError::malformed_path(
                            text,
                            "sub-attribute cannot carry a schema URN",
                        ));
                    }
                    Some(sub)
                }
                None => None,
            };
            return Ok(PatchPath::Filtered {
                attribute,
                filter,
                sub_attribute,
            });
        }

        if text.contains(['[', ']']) {
            return Err(PatchError::malformed_path(text, "unbalanced filter brackets"));
        }
        parse_attribute(text, text).map(PatchPath::Attribute)
    }
}

fn parse_attribute(path: &str, text: &str) -> PatchResult<AttributePath> {
    AttributePath::parse(text).map_err(|reason| PatchError::malformed_path(path, reason))
}

/// Resolve `path` to JSON Pointer reference tokens against `document`.
///
/// Core-schema URNs are dropped and extension URNs become their own token.
/// Where an attribute exists its actual key is used, so a case-insensitive
/// match still yields a pointer that addresses it exactly.
pub(crate) fn pointer_tokens(
    config: &EngineConfig,
    document: &Value,
    path: &AttributePath,
) -> Vec<String> {
    let mut names: Vec<&str> = Vec::with_capacity(path.segments().len() + 1);
    if let Some(schema) = path.schema() {
        if !config.is_core_schema(schema) {
            names.push(schema);
        }
    }
    names.extend(path.segments().iter().map(String::as_str));

    let mut current = Some(document);
    let mut tokens = Vec::with_capacity(names.len());
    for name in names {
        let object = current.and_then(Value::as_object);
        match object.and_then(|object| config.find_key(object, name).map(|key| (object, key))) {
            Some((object, key)) => {
                current = object.get(key);
                tokens.push(key.clone());
            }
            None => {
                current = None;
                tokens.push(name.to_string());
            }
        }
    }
    tokens
}

/// Escape one reference token per RFC 6901
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Append `token` to the pointer `base`
pub fn join_pointer(base: &str, token: &str) -> String {
    format!("{}/{}", base, escape_token(token))
}

/// Build a pointer from unescaped reference tokens.
pub fn to_pointer(tokens: &[String]) -> String {
    tokens
        .iter()
        .fold(String::new(), |pointer, token| join_pointer(&pointer, token))
}
