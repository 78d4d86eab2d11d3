//! SCIM filter expressions (RFC 7644 section 3.4.2.2).
//!
//! Filter text flows through three stages:
//!
//! 1. [`lexer`] splits the text into tokens.
//! 2. [`parser`] builds an immutable [`Expression`] tree.
//! 3. [`FilterMatcher`] evaluates the tree against JSON documents, and
//!    [`crate::query`] renders it for a search engine.
//!
//! # Example
//!
//! ```rust
//! use scim_filter_patch::filter::{matches, parse};
//! use serde_json::json;
//!
//! let filter = parse("name.familyName co \"ens\" and active eq true").unwrap();
//! let user = json!({"name": {"familyName": "Jensen"}, "active": true});
//! assert!(matches(&filter, &user).unwrap());
//! ```

pub mod attribute_path;
pub mod expression;
pub mod lexer;
pub mod matcher;
pub mod operator;
pub mod parser;

pub use attribute_path::AttributePath;
pub use expression::{CompareValue, Expression};
pub use matcher::{FilterMatcher, matches, validate};
pub use operator::{CompareOperator, LogicalOperator, ValueType};
pub use parser::parse;
