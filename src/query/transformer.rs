//! Rendering filter expressions as search-engine query strings.
//!
//! The output uses Lucene query-string syntax as understood by Elasticsearch
//! and OpenSearch:
//!
//! | Filter                      | Query                          |
//! |-----------------------------|--------------------------------|
//! | `title pr`                  | `_exists_:title`               |
//! | `nickName eq null`          | `nickName:null`                |
//! | `userName eq "bjensen"`     | `userName:"bjensen"`           |
//! | `userName ne "bjensen"`     | `!(userName:"bjensen")`        |
//! | `userName sw "bj"`          | `userName:"bj*"`               |
//! | `loginCount gt -5`          | `loginCount:>\-5`              |
//! | `meta.created ge "<date>"`  | `meta.created:[<date> TO *]`   |
//! | `a pr and b pr`             | `(_exists_:a AND _exists_:b)`  |
//! | `not (a pr)`                | `!(_exists_:a)`                |
//!
//! Paths inside `parent[...]` groupings are rendered fully qualified
//! (`emails.type`).

use crate::error::FilterResult;
use crate::filter::expression::format_decimal;
use crate::filter::matcher::check_operator;
use crate::filter::{
    AttributePath, CompareOperator, CompareValue, Expression, LogicalOperator, ValueType,
};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// Converts a filter expression into another query representation.
///
/// Implementors decide which operator/value-type pairings they accept and
/// report the rest as [`FilterError::InvalidFilterExpression`](crate::error::FilterError).
pub trait FilterTransformer {
    type Output;

    fn transform(&self, expression: &Expression) -> FilterResult<Self::Output>;
}

/// Renders expressions as a single-line Lucene query string.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::filter::parse;
/// use scim_filter_patch::query::{FilterTransformer, QueryStringTransformer};
///
/// let filter = parse("title pr and userType eq \"Employee\"").unwrap();
/// let query = QueryStringTransformer.transform(&filter).unwrap();
/// assert_eq!(query, "(_exists_:title AND userType:\"Employee\")");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringTransformer;

impl FilterTransformer for QueryStringTransformer {
    type Output = String;

    fn transform(&self, expression: &Expression) -> FilterResult<String> {
        render_expression(expression, None)
    }
}

/// Render `expression` with [`QueryStringTransformer`].
pub fn render(expression: &Expression) -> FilterResult<String> {
    QueryStringTransformer.transform(expression)
}

fn render_expression(
    expression: &Expression,
    parent: Option<&AttributePath>,
) -> FilterResult<String> {
    let qualify = |path: &AttributePath| match parent {
        Some(parent) => path.prefixed(parent),
        None => path.clone(),
    };

    match expression {
        Expression::Present { path } => Ok(format!("_exists_:{}", field(&qualify(path)))),
        Expression::Null { path, operator } => {
            let path = qualify(path);
            check_operator(*operator, ValueType::Null, || path.to_string())?;
            Ok(negate_if(
                *operator == CompareOperator::NotEqual,
                format!("{}:null", field(&path)),
            ))
        }
        Expression::Comparison {
            path,
            operator,
            value,
        } => {
            let path = qualify(path);
            check_operator(*operator, value.value_type(), || path.to_string())?;
            Ok(render_comparison(&field(&path), *operator, value))
        }
        Expression::Grouping {
            parent: group,
            filter,
        } => render_expression(filter, Some(&qualify(group))),
        Expression::Logical {
            left,
            operator,
            right,
        } => {
            let keyword = match operator {
                LogicalOperator::And => "AND",
                LogicalOperator::Or => "OR",
            };
            Ok(format!(
                "({} {} {})",
                render_expression(left, parent)?,
                keyword,
                render_expression(right, parent)?
            ))
        }
        Expression::Not(filter) => Ok(format!("!({})", render_expression(filter, parent)?)),
    }
}

/// Render a comparison whose operator has already been checked against the value type.
fn render_comparison(field: &str, operator: CompareOperator, value: &CompareValue) -> String {
    let literal = match value {
        CompareValue::Date(date) => return render_date_range(field, operator, date),
        CompareValue::Text(text) => match operator {
            CompareOperator::StartsWith => quote(&format!("{}*", text)),
            CompareOperator::EndsWith => quote(&format!("*{}", text)),
            _ => quote(text),
        },
        CompareValue::Number(number) => {
            let text = format_decimal(number);
            match text.strip_prefix('-') {
                Some(magnitude) => format!("\\-{}", magnitude),
                None => text,
            }
        }
        CompareValue::Boolean(flag) => flag.to_string(),
    };

    let glyph = match operator {
        CompareOperator::GreaterThan => ":>",
        CompareOperator::GreaterThanOrEqual => ":>=",
        CompareOperator::LessThan => ":<",
        CompareOperator::LessThanOrEqual => ":<=",
        _ => ":",
    };

    negate_if(
        operator == CompareOperator::NotEqual,
        format!("{}{}{}", field, glyph, literal),
    )
}

/// Dates render as ranges with millisecond UTC bounds.
fn render_date_range(
    field: &str,
    operator: CompareOperator,
    date: &DateTime<FixedOffset>,
) -> String {
    let instant = date
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let range = match operator {
        CompareOperator::GreaterThanOrEqual => format!("[{} TO *]", instant),
        CompareOperator::GreaterThan => format!("{{{} TO *]", instant),
        CompareOperator::LessThanOrEqual => format!("[* TO {}]", instant),
        CompareOperator::LessThan => format!("[* TO {}}}", instant),
        _ => format!("[{} TO {}]", instant, instant),
    };
    negate_if(
        operator == CompareOperator::NotEqual,
        format!("{}:{}", field, range),
    )
}

fn negate_if(negate: bool, clause: String) -> String {
    if negate {
        format!("!({})", clause)
    } else {
        clause
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Field names escape the characters the query syntax reserves (the colons
/// of a schema URN in particular).
fn field(path: &AttributePath) -> String {
    let mut escaped = String::new();
    for c in path.to_string().chars() {
        if matches!(c, ':' | '-' | '/' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
