//! Search-engine query rendering for filter expressions.

pub mod transformer;

pub use transformer::{FilterTransformer, QueryStringTransformer, render};
