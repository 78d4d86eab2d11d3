//! SCIM attribute paths.
//!
//! An attribute path is a sequence of dot-separated attribute names, optionally
//! qualified by a schema URN (`urn:ietf:params:scim:schemas:core:2.0:User:name.givenName`).
//! The URN is kept whole as a distinguished leading segment; dots inside it
//! (such as the `2.0` version) are never treated as separators.

use std::fmt;

/// Schema URN of the core User resource
pub const CORE_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// Schema URN of the core Group resource
pub const CORE_GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
/// Schema URN of the Enterprise User extension
pub const ENTERPRISE_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// URNs recognised as a whole when a path names only the schema.
///
/// Without this list `urn:...:enterprise:2.0:User` would be read as the
/// attribute `User` of schema `urn:...:enterprise:2.0`.
const KNOWN_SCHEMAS: [&str; 3] = [CORE_USER_SCHEMA, CORE_GROUP_SCHEMA, ENTERPRISE_USER_SCHEMA];

/// A parsed SCIM attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    schema: Option<String>,
    segments: Vec<String>,
}

impl AttributePath {
    /// Build a path from parts without validating attribute names.
    pub fn new(schema: Option<String>, segments: Vec<String>) -> Self {
        Self { schema, segments }
    }

    /// Parse attribute path text.
    ///
    /// Returns a human readable reason when the text is not a valid path; the
    /// filter parser and patch converter wrap it in their own error kinds.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.is_empty() {
            return Err("empty attribute path".to_string());
        }

        let (schema, attributes) = split_schema(text)?;
        let segments = if attributes.is_empty() {
            Vec::new()
        } else {
            attributes
                .split('.')
                .map(|segment| validate_segment(segment).map(str::to_string))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { schema, segments })
    }

    /// The schema URN qualifying this path, without the trailing colon
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The attribute names, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Return this path made relative to `parent`, as used inside
    /// `parent[...]` filter groupings: `type` under `emails` becomes `emails.type`.
    pub fn prefixed(&self, parent: &AttributePath) -> AttributePath {
        let mut segments = parent.segments.clone();
        segments.extend(self.segments.iter().cloned());
        AttributePath {
            schema: parent.schema.clone().or_else(|| self.schema.clone()),
            segments,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.schema, self.segments.is_empty()) {
            (Some(schema), true) => f.write_str(schema),
            (Some(schema), false) => write!(f, "{}:{}", schema, self.segments.join(".")),
            (None, _) => f.write_str(&self.segments.join(".")),
        }
    }
}

fn split_schema(text: &str) -> Result<(Option<String>, &str), String> {
    if !text.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("urn:")) {
        if text.contains(':') {
            return Err(format!("'{}' is not a valid attribute path", text));
        }
        return Ok((None, text));
    }

    for known in KNOWN_SCHEMAS {
        let Some(head) = text.get(..known.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(known) {
            continue;
        }
        let rest = &text[known.len()..];
        if rest.is_empty() {
            return Ok((Some(head.to_string()), ""));
        }
        if let Some(attributes) = rest.strip_prefix(':') {
            return non_empty_attributes(head, attributes);
        }
    }

    match text.rsplit_once(':') {
        Some((schema, attributes)) => non_empty_attributes(schema, attributes),
        None => Err(format!("'{}' is not a valid schema URN", text)),
    }
}

fn non_empty_attributes<'a>(
    schema: &str,
    attributes: &'a str,
) -> Result<(Option<String>, &'a str), String> {
    if attributes.is_empty() {
        return Err(format!("missing attribute name after schema '{}'", schema));
    }
    Ok((Some(schema.to_string()), attributes))
}

fn validate_segment(segment: &str) -> Result<&str, String> {
    let mut chars = segment.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '$' || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    };
    if valid {
        Ok(segment)
    } else {
        Err(format!("invalid attribute name '{}'", segment))
    }
}
