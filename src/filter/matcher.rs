//! Evaluation of filter expressions against JSON documents.
//!
//! The matcher reads a `serde_json::Value` (a whole resource or one element of a
//! multi-valued attribute) and never modifies it.
//!
//! # Semantics
//!
//! * Attribute resolution flattens arrays, so a comparison against a
//!   multi-valued attribute matches when any of its values matches.
//! * A path that resolves to nothing is a plain non-match, never an error.
//! * A value of the wrong JSON type for the operand (a string where a number
//!   is expected, an unparseable date) is a non-match.
//! * An operator that cannot apply to the operand type (`gt` on a boolean,
//!   `co` on a number) is a [`FilterError::InvalidFilterExpression`]. The whole
//!   tree is checked before evaluation so short-circuiting never hides one.

use super::attribute_path::AttributePath;
use super::expression::{CompareValue, Expression, parse_decimal};
use super::operator::{CompareOperator, LogicalOperator, ValueType};
use crate::config::EngineConfig;
use crate::error::{FilterError, FilterResult};
use bigdecimal::BigDecimal;
use chrono::DateTime;
use log::trace;
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluates [`Expression`]s against JSON documents.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::filter::{parse, FilterMatcher};
/// use serde_json::json;
///
/// let user = json!({
///     "userName": "bjensen",
///     "emails": [{"type": "work", "value": "bjensen@example.com"}]
/// });
/// let matcher = FilterMatcher::new();
/// let filter = parse("emails[type eq \"work\" and value co \"@example.com\"]").unwrap();
/// assert!(matcher.matches(&filter, &user).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterMatcher {
    config: EngineConfig,
}

impl FilterMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `expression` against `document`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidFilterExpression`] if any comparison in the
    /// tree pairs an operator with a value type that does not support it.
    pub fn matches(&self, expression: &Expression, document: &Value) -> FilterResult<bool> {
        validate(expression)?;
        Ok(self.evaluate(expression, document))
    }

    /// Return the documents matching `expression`, in their original order.
    pub fn filter<'a>(
        &self,
        expression: &Expression,
        documents: &'a [Value],
    ) -> FilterResult<Vec<&'a Value>> {
        validate(expression)?;
        Ok(documents
            .iter()
            .filter(|document| self.evaluate(expression, document))
            .collect())
    }

    /// Resolve an attribute path to the values it names, flattening arrays.
    ///
    /// A core-schema URN resolves against the document root; any other URN
    /// selects the extension object stored under that URN.
    pub fn resolve<'a>(&self, document: &'a Value, path: &AttributePath) -> Vec<&'a Value> {
        let mut nodes = vec![document];
        if let Some(schema) = path.schema() {
            if !self.config.is_core_schema(schema) {
                nodes = self.children(&nodes, schema);
            }
        }
        for segment in path.segments() {
            nodes = self.children(&nodes, segment);
        }

        let mut resolved = Vec::with_capacity(nodes.len());
        for node in nodes {
            push_flattened(&mut resolved, node);
        }
        resolved
    }

    fn children<'a>(&self, nodes: &[&'a Value], attribute: &str) -> Vec<&'a Value> {
        let mut children = Vec::new();
        for node in nodes {
            let mut parents = Vec::new();
            push_flattened(&mut parents, node);
            for parent in parents {
                let Value::Object(object) = parent else {
                    continue;
                };
                if let Some(key) = self.config.find_key(object, attribute) {
                    children.extend(object.get(key));
                }
            }
        }
        children
    }

    fn evaluate(&self, expression: &Expression, document: &Value) -> bool {
        match expression {
            Expression::Present { path } => self
                .resolve(document, path)
                .iter()
                .any(|value| !value.is_null()),
            Expression::Null { path, operator } => {
                let has_value = self
                    .resolve(document, path)
                    .iter()
                    .any(|value| !value.is_null());
                match operator {
                    CompareOperator::Equal => !has_value,
                    _ => has_value,
                }
            }
            Expression::Comparison {
                path,
                operator,
                value,
            } => self
                .resolve(document, path)
                .into_iter()
                .any(|node| compare(node, *operator, value)),
            Expression::Grouping { parent, filter } => self
                .resolve(document, parent)
                .into_iter()
                .any(|node| self.evaluate(filter, node)),
            Expression::Logical {
                left,
                operator: LogicalOperator::And,
                right,
            } => self.evaluate(left, document) && self.evaluate(right, document),
            Expression::Logical {
                left,
                operator: LogicalOperator::Or,
                right,
            } => self.evaluate(left, document) || self.evaluate(right, document),
            Expression::Not(filter) => !self.evaluate(filter, document),
        }
    }
}

/// Evaluate `expression` against `document` with the default configuration.
pub fn matches(expression: &Expression, document: &Value) -> FilterResult<bool> {
    FilterMatcher::new().matches(expression, document)
}

/// Check every comparison in the tree for a legal operator/value-type pairing.
///
/// Grouped comparisons are reported with their fully qualified attribute path.
pub fn validate(expression: &Expression) -> FilterResult<()> {
    validate_under(expression, None)
}

fn validate_under(expression: &Expression, parent: Option<&AttributePath>) -> FilterResult<()> {
    let qualified = |path: &AttributePath| match parent {
        Some(parent) => path.prefixed(parent).to_string(),
        None => path.to_string(),
    };

    match expression {
        Expression::Present { .. } => Ok(()),
        Expression::Null { path, operator } => {
            check_operator(*operator, ValueType::Null, || qualified(path))
        }
        Expression::Comparison {
            path,
            operator,
            value,
        } => check_operator(*operator, value.value_type(), || qualified(path)),
        Expression::Grouping {
            parent: group,
            filter,
        } => {
            let group = match parent {
                Some(parent) => group.prefixed(parent),
                None => group.clone(),
            };
            validate_under(filter, Some(&group))
        }
        Expression::Logical { left, right, .. } => {
            validate_under(left, parent)?;
            validate_under(right, parent)
        }
        Expression::Not(filter) => validate_under(filter, parent),
    }
}

/// Fail unless `operator` may be applied to a `value_type` operand.
pub(crate) fn check_operator(
    operator: CompareOperator,
    value_type: ValueType,
    attribute: impl FnOnce() -> String,
) -> FilterResult<()> {
    if operator.supports(value_type) {
        Ok(())
    } else {
        Err(FilterError::invalid_expression(
            attribute(),
            operator,
            value_type,
        ))
    }
}

fn push_flattened<'a>(out: &mut Vec<&'a Value>, value: &'a Value) {
    match value {
        Value::Array(items) => out.extend(items.iter()),
        other => out.push(other),
    }
}

fn compare(node: &Value, operator: CompareOperator, expected: &CompareValue) -> bool {
    let matched = match expected {
        CompareValue::Text(expected) => node
            .as_str()
            .map(|actual| compare_text(actual, operator, expected)),
        CompareValue::Number(expected) => {
            decimal_of(node).map(|actual| ordering_satisfies(actual.cmp(expected), operator))
        }
        CompareValue::Boolean(expected) => node
            .as_bool()
            .map(|actual| ordering_satisfies(actual.cmp(expected), operator)),
        CompareValue::Date(expected) => node
            .as_str()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|actual| ordering_satisfies(actual.cmp(expected), operator)),
    };

    matched.unwrap_or_else(|| {
        trace!(
            "Value {} is not comparable with {} operand",
            node,
            expected.value_type()
        );
        false
    })
}

fn compare_text(actual: &str, operator: CompareOperator, expected: &str) -> bool {
    match operator {
        CompareOperator::Contains => actual.contains(expected),
        CompareOperator::StartsWith => actual.starts_with(expected),
        CompareOperator::EndsWith => actual.ends_with(expected),
        _ => ordering_satisfies(actual.cmp(expected), operator),
    }
}

fn ordering_satisfies(ordering: Ordering, operator: CompareOperator) -> bool {
    match operator {
        CompareOperator::Equal => ordering == Ordering::Equal,
        CompareOperator::NotEqual => ordering != Ordering::Equal,
        CompareOperator::GreaterThan => ordering == Ordering::Greater,
        CompareOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        CompareOperator::LessThan => ordering == Ordering::Less,
        CompareOperator::LessThanOrEqual => ordering != Ordering::Greater,
        CompareOperator::Contains
        | CompareOperator::StartsWith
        | CompareOperator::EndsWith
        | CompareOperator::Present => false,
    }
}

/// Read a JSON number as an exact decimal from its source text.
pub(crate) fn decimal_of(node: &Value) -> Option<BigDecimal> {
    match node {
        Value::Number(number) => parse_decimal(&number.to_string()),
        _ => None,
    }
}
