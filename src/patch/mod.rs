//! SCIM PATCH (RFC 7644 section 3.5.2) to JSON Patch (RFC 6902) conversion.
//!
//! [`PatchConverter`] turns abstract SCIM operations, whose paths may select
//! array elements with a filter, into concrete pointer-addressed operations.
//! [`apply`] runs the result against a document.
//!
//! ```rust
//! use scim_filter_patch::patch::{PatchRequest, apply, convert};
//! use serde_json::json;
//!
//! let mut group = json!({
//!     "displayName": "Tour Guides",
//!     "members": [{"value": "2819c223"}, {"value": "902c246b"}, {"value": "c3a26dd3"}]
//! });
//! let request = PatchRequest::from_value(json!({
//!     "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!     "Operations": [
//!         {"op": "remove", "path": "members[value ne \"902c246b\"]"},
//!         {"op": "replace", "path": "displayName", "value": "Guides"}
//!     ]
//! }))
//! .unwrap();
//!
//! let patch = convert(&request.operations, &group).unwrap();
//! apply(&mut group, &patch).unwrap();
//! assert_eq!(group["members"], json!([{"value": "902c246b"}]));
//! assert_eq!(group["displayName"], "Guides");
//! ```

pub mod apply;
pub mod converter;
pub mod operation;
pub mod path;

pub use apply::apply;
pub use converter::{PatchConverter, convert};
pub use operation::{JsonPatchOperation, PATCH_OP_SCHEMA, PatchOp, PatchRequest, ScimPatchOperation};
pub use path::PatchPath;
