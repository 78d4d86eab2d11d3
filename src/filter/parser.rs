//! Recursive-descent parser for SCIM filter expressions.
//!
//! Grammar handled here (RFC 7644 section 3.4.2.2):
//!
//! ```text
//! filter   = term *( ("and" / "or") term )
//! term     = "(" filter ")"
//!          / "not" "(" filter ")"
//!          / attrPath "[" filter "]"
//!          / attrPath "pr"
//!          / attrPath compareOp compValue
//! ```
//!
//! A run of terms joined by a single keyword folds right-to-left. When `and`
//! and `or` are mixed at one level, each `and` in turn joins the two atoms at
//! its position in the original term list; the atoms left are joined by `or`
//! left-to-right, except that a trailing run of two or more single terms is
//! first folded right-to-left on its own.

use super::attribute_path::AttributePath;
use super::expression::{CompareValue, Expression, parse_decimal};
use super::lexer::{Token, TokenKind, tokenize};
use super::operator::{CompareOperator, LogicalOperator};
use crate::error::{ParseError, ParseResult};
use chrono::DateTime;
use regex::Regex;
use std::sync::LazyLock;

static NUMBER_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d+(\.\d+)?([eE][+-]?\d+)?$").expect("valid regex")
});

static DATE_TIME_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
        .expect("valid regex")
});

/// Parse SCIM filter text into an [`Expression`].
///
/// Parsing is a pure function of the input and aborts at the first error;
/// no partial tree is ever returned.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::filter::{parse, Expression};
///
/// let expr = parse("userName eq \"bjensen\" and title pr").unwrap();
/// assert!(matches!(expr, Expression::Logical { .. }));
/// assert!(parse("userName xx \"bjensen\"").is_err());
/// ```
pub fn parse(input: &str) -> ParseResult<Expression> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty filter", input, 0));
    }
    let mut parser = Parser {
        input,
        tokens,
        cursor: 0,
    };
    parser.parse_filter(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Paren,
    Bracket,
}

impl Closer {
    fn opening(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn error_at(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError::new(message, self.input, position)
    }

    fn error_at_end(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.input, self.input.len())
    }

    /// Parse terms joined by logical keywords until the end of input, or until
    /// the closer matching an opening character at `closer.1`.
    fn parse_filter(&mut self, closer: Option<(Closer, usize)>) -> ParseResult<Expression> {
        let mut terms = vec![self.parse_term()?];
        let mut operators = Vec::new();

        loop {
            let Some(token) = self.advance() else {
                if let Some((closer, opened_at)) = closer {
                    return Err(self.error_at(
                        format!("unmatched '{}'", closer.opening()),
                        opened_at,
                    ));
                }
                break;
            };

            match (token.kind, closer) {
                (TokenKind::RightParen, Some((Closer::Paren, _)))
                | (TokenKind::RightBracket, Some((Closer::Bracket, _))) => break,
                (TokenKind::Word(word), _) => match LogicalOperator::from_keyword(&word) {
                    Some(operator) => {
                        operators.push(operator);
                        terms.push(self.parse_term()?);
                    }
                    None => {
                        return Err(self.error_at(
                            format!("expected 'and' or 'or' but found '{}'", word),
                            token.position,
                        ));
                    }
                },
                (TokenKind::RightParen, _) => {
                    return Err(self.error_at("unmatched ')'", token.position));
                }
                (TokenKind::RightBracket, _) => {
                    return Err(self.error_at("unmatched ']'", token.position));
                }
                _ => {
                    return Err(self.error_at(
                        "expected a logical operator after expression",
                        token.position,
                    ));
                }
            }
        }

        combine(terms, operators).ok_or_else(|| self.error_at("empty filter", 0))
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.advance() else {
            return Err(self.error_at_end("unexpected end of filter, expected an attribute path"));
        };

        match token.kind {
            TokenKind::LeftParen => self.parse_filter(Some((Closer::Paren, token.position))),
            TokenKind::Word(word) if word == "not" => match self.advance() {
                Some(Token {
                    kind: TokenKind::LeftParen,
                    position,
                }) => {
                    let inner = self.parse_filter(Some((Closer::Paren, position)))?;
                    Ok(Expression::negate(inner))
                }
                _ => Err(self.error_at(
                    "'not' must be followed by a parenthesized filter",
                    token.position,
                )),
            },
            TokenKind::Word(word) => self.parse_attribute_term(&word, token.position),
            _ => Err(self.error_at("expected an attribute path", token.position)),
        }
    }

    fn parse_attribute_term(&mut self, text: &str, position: usize) -> ParseResult<Expression> {
        let path = AttributePath::parse(text).map_err(|reason| self.error_at(reason, position))?;

        match self.advance() {
            Some(Token {
                kind: TokenKind::LeftBracket,
                position: opened_at,
            }) => {
                // Paths inside the brackets stay relative to `path`.
                let filter = self.parse_filter(Some((Closer::Bracket, opened_at)))?;
                Ok(Expression::grouping(path, filter))
            }
            Some(Token {
                kind: TokenKind::Word(keyword),
                position: operator_at,
            }) => {
                let operator = CompareOperator::from_keyword(&keyword).ok_or_else(|| {
                    self.error_at(format!("unknown operator '{}'", keyword), operator_at)
                })?;
                if operator == CompareOperator::Present {
                    self.ensure_no_value()?;
                    return Ok(Expression::present(path));
                }
                self.parse_comparison(path, operator)
            }
            Some(token) => Err(self.error_at(
                format!("expected an operator after '{}'", text),
                token.position,
            )),
            None => Err(self.error_at_end(format!(
                "unexpected end of filter, expected an operator after '{}'",
                text
            ))),
        }
    }

    fn ensure_no_value(&self) -> ParseResult<()> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Quoted(_),
                position,
            }) => Err(self.error_at("operator 'pr' does not take a value", *position)),
            Some(Token {
                kind: TokenKind::Word(word),
                position,
            }) if LogicalOperator::from_keyword(word).is_none() => {
                Err(self.error_at("operator 'pr' does not take a value", *position))
            }
            _ => Ok(()),
        }
    }

    fn parse_comparison(
        &mut self,
        path: AttributePath,
        operator: CompareOperator,
    ) -> ParseResult<Expression> {
        let Some(token) = self.advance() else {
            return Err(self.error_at_end(format!("operator '{}' requires a value", operator)));
        };

        let value = match token.kind {
            TokenKind::Quoted(text) => quoted_literal(text),
            TokenKind::Word(word) => match word.as_str() {
                "null" => return Ok(Expression::null(path, operator)),
                "true" => CompareValue::Boolean(true),
                "false" => CompareValue::Boolean(false),
                _ if NUMBER_LITERAL.is_match(&word) => parse_decimal(&word)
                    .map(CompareValue::Number)
                    .ok_or_else(|| {
                        self.error_at(
                            format!("numeric literal '{}' is out of range", word),
                            token.position,
                        )
                    })?,
                _ => {
                    return Err(self.error_at(
                        format!("invalid comparison value '{}'", word),
                        token.position,
                    ));
                }
            },
            _ => {
                return Err(self.error_at(
                    format!("operator '{}' requires a value", operator),
                    token.position,
                ));
            }
        };

        Ok(Expression::comparison(path, operator, value))
    }
}

/// A quoted literal is a date when it has the full ISO-8601 date-time shape
/// and names a real instant; otherwise it is text.
fn quoted_literal(text: String) -> CompareValue {
    if DATE_TIME_LITERAL.is_match(&text) {
        if let Ok(date) = DateTime::parse_from_rfc3339(&text) {
            return CompareValue::Date(date);
        }
    }
    CompareValue::Text(text)
}

fn combine(terms: Vec<Expression>, operators: Vec<LogicalOperator>) -> Option<Expression> {
    let Some(&first) = operators.first() else {
        return terms.into_iter().next();
    };
    if operators.iter().all(|operator| *operator == first) {
        return fold_right(terms, first);
    }

    // Each `and` joins the two atoms at its original position; positions past
    // the shrunken end are dropped. The flag marks atoms that are single terms.
    let mut atoms: Vec<(Expression, bool)> = terms.into_iter().map(|term| (term, true)).collect();
    for (position, operator) in operators.into_iter().enumerate() {
        if operator != LogicalOperator::And || position + 1 >= atoms.len() {
            continue;
        }
        let (right, _) = atoms.remove(position + 1);
        let (left, _) = atoms.remove(position);
        atoms.insert(position, (Expression::and(left, right), false));
    }

    let trailing_singles = atoms.iter().rev().take_while(|(_, single)| *single).count();
    let tail = if trailing_singles >= 2 {
        atoms.split_off(atoms.len() - trailing_singles)
    } else {
        Vec::new()
    };
    let tail = fold_right(tail.into_iter().map(|(atom, _)| atom).collect(), LogicalOperator::Or);

    atoms
        .into_iter()
        .map(|(atom, _)| atom)
        .chain(tail)
        .reduce(Expression::or)
}

fn fold_right(items: Vec<Expression>, operator: LogicalOperator) -> Option<Expression> {
    items
        .into_iter()
        .rev()
        .reduce(|right, left| Expression::logical(left, operator, right))
}
