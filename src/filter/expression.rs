//! The filter expression tree.
//!
//! An [`Expression`] is built once by the parser and never mutated. It holds no
//! shared state or back-references, so one tree can be evaluated against many
//! documents concurrently.
//!
//! Constructors only guarantee structural shape. Whether an operator may be
//! applied to a value type is decided by the consumer (matcher or query
//! transformer), because different consumers may impose different rules.

use super::attribute_path::AttributePath;
use super::operator::{CompareOperator, LogicalOperator, ValueType};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use bigdecimal::BigDecimal;
use std::fmt;
use std::str::FromStr;

/// A typed comparison operand.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareValue {
    /// A quoted string literal
    Text(String),
    /// A bare numeric literal, compared with exact decimal semantics
    Number(BigDecimal),
    /// `true` or `false`
    Boolean(bool),
    /// A quoted literal shaped like an ISO-8601 date-time
    Date(DateTime<FixedOffset>),
}

impl CompareValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) => ValueType::Text,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Date(_) => ValueType::Date,
        }
    }
}

impl fmt::Display for CompareValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write_quoted(f, text),
            Self::Number(number) => f.write_str(&format_decimal(number)),
            Self::Boolean(flag) => write!(f, "{}", flag),
            Self::Date(date) => write_quoted(f, &date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// Parse decimal text, accepting an optional sign and exponent (`42`, `-4.2`, `42e1`).
///
/// Returns `None` when the text is not a number.
pub(crate) fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    BigDecimal::from_str(unsigned).ok()
}

/// Plain positional notation with trailing zeros dropped: `420`, `-0.015`.
pub(crate) fn format_decimal(number: &BigDecimal) -> String {
    let (digits, scale) = number.normalized().into_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", digits.as_str()),
    };

    let plain = if scale <= 0 {
        format!("{}{}", digits, "0".repeat(scale.unsigned_abs() as usize))
    } else {
        let scale = scale as usize;
        if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            format!("{}.{}", whole, fraction)
        } else {
            format!("0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    };
    format!("{}{}", sign, plain)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

/// A SCIM filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `attr pr`
    Present { path: AttributePath },

    /// `attr eq null` / `attr ne null`
    Null {
        path: AttributePath,
        operator: CompareOperator,
    },

    /// `attr op value`
    Comparison {
        path: AttributePath,
        operator: CompareOperator,
        value: CompareValue,
    },

    /// `parent[filter]`. Attribute paths inside `filter` are relative to `parent`.
    Grouping {
        parent: AttributePath,
        filter: Box<Expression>,
    },

    /// `left and right` / `left or right`
    Logical {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
    },

    /// `not (filter)`
    Not(Box<Expression>),
}

impl Expression {
    pub fn present(path: AttributePath) -> Self {
        Self::Present { path }
    }

    pub fn null(path: AttributePath, operator: CompareOperator) -> Self {
        Self::Null { path, operator }
    }

    pub fn comparison(path: AttributePath, operator: CompareOperator, value: CompareValue) -> Self {
        Self::Comparison {
            path,
            operator,
            value,
        }
    }

    pub fn grouping(parent: AttributePath, filter: Expression) -> Self {
        Self::Grouping {
            parent,
            filter: Box::new(filter),
        }
    }

    pub fn logical(left: Expression, operator: LogicalOperator, right: Expression) -> Self {
        Self::Logical {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::logical(left, LogicalOperator::And, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::logical(left, LogicalOperator::Or, right)
    }

    pub fn negate(filter: Expression) -> Self {
        Self::Not(Box::new(filter))
    }

    /// The attribute path tested by a leaf or the parent of a grouping.
    pub fn attribute_path(&self) -> Option<&AttributePath> {
        match self {
            Self::Present { path } | Self::Null { path, .. } | Self::Comparison { path, .. } => {
                Some(path)
            }
            Self::Grouping { parent, .. } => Some(parent),
            Self::Logical { .. } | Self::Not(_) => None,
        }
    }
}

/// Canonical SCIM filter text. Nested logical expressions are always
/// parenthesised so the text parses back into the same tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present { path } => write!(f, "{} pr", path),
            Self::Null { path, operator } => write!(f, "{} {} null", path, operator),
            Self::Comparison {
                path,
                operator,
                value,
            } => write!(f, "{} {} {}", path, operator, value),
            Self::Grouping { parent, filter } => write!(f, "{}[{}]", parent, filter),
            Self::Logical {
                left,
                operator,
                right,
            } => {
                write_operand(f, left)?;
                write!(f, " {} ", operator)?;
                write_operand(f, right)
            }
            Self::Not(filter) => write!(f, "not ({})", filter),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expression) -> fmt::Result {
    match operand {
        Expression::Logical { .. } => write!(f, "({})", operand),
        _ => write!(f, "{}", operand),
    }
}
