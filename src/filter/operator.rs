//! Filter operators and the value types they apply to.

use std::fmt;

/// SCIM attribute comparison operators (RFC 7644 section 3.4.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    /// Equal comparison
    Equal,

    /// Not equal comparison
    NotEqual,

    /// Contains operation for strings
    Contains,

    /// Starts with operation for strings
    StartsWith,

    /// Ends with operation for strings
    EndsWith,

    /// Present (attribute exists)
    Present,

    /// Greater than
    GreaterThan,

    /// Greater than or equal
    GreaterThanOrEqual,

    /// Less than
    LessThan,

    /// Less than or equal
    LessThanOrEqual,
}

impl CompareOperator {
    /// Look up an operator keyword. Keywords are lowercase.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let operator = match keyword {
            "eq" => Self::Equal,
            "ne" => Self::NotEqual,
            "co" => Self::Contains,
            "sw" => Self::StartsWith,
            "ew" => Self::EndsWith,
            "pr" => Self::Present,
            "gt" => Self::GreaterThan,
            "ge" => Self::GreaterThanOrEqual,
            "lt" => Self::LessThan,
            "le" => Self::LessThanOrEqual,
            _ => return None,
        };
        Some(operator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::Contains => "co",
            Self::StartsWith => "sw",
            Self::EndsWith => "ew",
            Self::Present => "pr",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "ge",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "le",
        }
    }

    /// `co`, `sw` and `ew`
    pub fn is_substring(&self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }

    /// Whether this operator may be applied to a value of the given type.
    ///
    /// Text supports everything but `pr`; numbers and dates support equality
    /// and ordering; booleans and null support equality only.
    pub fn supports(&self, value_type: ValueType) -> bool {
        if *self == Self::Present {
            return false;
        }
        match value_type {
            ValueType::Text => true,
            ValueType::Number | ValueType::Date => !self.is_substring(),
            ValueType::Boolean | ValueType::Null => {
                matches!(self, Self::Equal | Self::NotEqual)
            }
        }
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operators joining two filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type tag of a comparison operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Number,
    Boolean,
    Date,
    Null,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}
