//! SCIM 2.0 filter and PATCH engine for Rust.
//!
//! Implements the two sub-languages of SCIM (RFC 7644) that operate on
//! resources rather than transport them: filter expressions (section 3.4.2.2)
//! and PATCH operations (section 3.5.2). Resources are plain
//! [`serde_json::Value`] documents.
//!
//! # Core Components
//!
//! - [`filter`] - Parse filter text into an [`Expression`] and evaluate it with [`FilterMatcher`]
//! - [`query`] - Render an expression as a search-engine query string
//! - [`patch`] - Convert SCIM PATCH operations into index-resolved JSON Patch
//!
//! # Quick Start
//!
//! ```rust
//! use scim_filter_patch::{ScimPatchOperation, convert, matches, parse, render};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = json!({
//!     "userName": "bjensen",
//!     "emails": [
//!         {"type": "work", "value": "bjensen@example.com"},
//!         {"type": "home", "value": "babs@jensen.org"}
//!     ]
//! });
//!
//! let filter = parse("userName eq \"bjensen\" and emails[type eq \"work\"]")?;
//! assert!(matches(&filter, &user)?);
//! assert_eq!(
//!     render(&filter)?,
//!     "(userName:\"bjensen\" AND emails.type:\"work\")"
//! );
//!
//! let operations = [ScimPatchOperation::remove("emails[type eq \"home\"]")];
//! let patch = convert(&operations, &user)?;
//! assert_eq!(patch[0].path, "/emails/1");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod patch;
pub mod query;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use error::{
    FilterError, FilterResult, ParseError, ParseResult, PatchError, PatchResult, ScimError,
    ScimResult,
};
pub use filter::{
    AttributePath, CompareOperator, CompareValue, Expression, FilterMatcher, LogicalOperator,
    ValueType, matches, parse, validate,
};
pub use patch::{
    JsonPatchOperation, PatchConverter, PatchOp, PatchRequest, ScimPatchOperation, apply, convert,
};
pub use query::{FilterTransformer, QueryStringTransformer, render};
