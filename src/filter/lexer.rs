//! Tokenizer for SCIM filter text.
//!
//! Produces a flat token stream; the parser decides whether a [`TokenKind::Word`]
//! is an attribute path, an operator keyword, a logical keyword or a bare literal
//! from its position in the grammar.

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    /// A run of characters up to whitespace, a structural character or a quote
    Word(String),
    /// A double-quoted literal, already unescaped
    Quoted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character
    pub position: usize,
}

/// Split filter text into tokens.
///
/// Inside a quoted literal `\"` and `\\` unescape to `"` and `\`; any other
/// backslash sequence is kept verbatim.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut terminated = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            terminated = true;
                            break;
                        }
                        '\\' => match chars.peek() {
                            Some(&(_, escaped @ ('"' | '\\'))) => {
                                text.push(escaped);
                                chars.next();
                            }
                            _ => text.push('\\'),
                        },
                        other => text.push(other),
                    }
                }
                if !terminated {
                    return Err(ParseError::new("unterminated string literal", input, position));
                }
                tokens.push(Token {
                    kind: TokenKind::Quoted(text),
                    position,
                });
                continue;
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    position,
                });
                continue;
            }
        };
        chars.next();
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}
