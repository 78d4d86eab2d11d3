//! Applying JSON Patch operations to a resource.
//!
//! Supports the `add`, `remove` and `replace` operations of RFC 6902 with two
//! SCIM-oriented relaxations:
//!
//! - `add` creates missing intermediate objects, so `/name/givenName` can be
//!   added to a resource without a `name`
//! - the pointers `""` and `"/"` both address the resource root, and adding an
//!   object there merges its fields into the resource
//!
//! Application is atomic: operations run against a copy that replaces the
//! document only when every operation succeeded.

use crate::error::{PatchError, PatchResult};
use crate::patch::operation::{JsonPatchOperation, PatchOp};
use crate::patch::path::unescape_token;
use serde_json::{Value, json};

/// Apply `operations` to `document` in order.
///
/// # Errors
///
/// Returns [`PatchError::Application`] naming the first operation that could
/// not be applied; `document` is left untouched in that case.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::patch::{apply, JsonPatchOperation};
/// use serde_json::json;
///
/// let mut user = json!({"emails": [{"value": "a"}, {"value": "b"}]});
/// apply(&mut user, &[JsonPatchOperation::remove("/emails/0")]).unwrap();
/// assert_eq!(user, json!({"emails": [{"value": "b"}]}));
/// ```
pub fn apply(document: &mut Value, operations: &[JsonPatchOperation]) -> PatchResult<()> {
    let mut patched = document.clone();
    for operation in operations {
        apply_operation(&mut patched, operation)?;
    }
    *document = patched;
    Ok(())
}

fn apply_operation(document: &mut Value, operation: &JsonPatchOperation) -> PatchResult<()> {
    let tokens = parse_pointer(&operation.path)?;
    let value = || {
        operation.value.clone().ok_or_else(|| PatchError::MissingValue {
            op: operation.op.to_string(),
        })
    };

    match operation.op {
        PatchOp::Add => add_value(document, &operation.path, &tokens, value()?),
        PatchOp::Remove => remove_value(document, &operation.path, &tokens),
        PatchOp::Replace => {
            let target = navigate(document, &operation.path, &tokens)?;
            *target = value()?;
            Ok(())
        }
    }
}

fn parse_pointer(pointer: &str) -> PatchResult<Vec<String>> {
    match pointer {
        "" | "/" => Ok(Vec::new()),
        _ => match pointer.strip_prefix('/') {
            Some(rest) => Ok(rest.split('/').map(unescape_token).collect()),
            None => Err(PatchError::application(pointer, "pointer must start with '/'")),
        },
    }
}

fn add_value(
    document: &mut Value,
    pointer: &str,
    tokens: &[String],
    value: Value,
) -> PatchResult<()> {
    let Some((last, parents)) = tokens.split_last() else {
        match (document, value) {
            (Value::Object(resource), Value::Object(fields)) => resource.extend(fields),
            (document, value) => *document = value,
        }
        return Ok(());
    };

    let mut current = document;
    for token in parents {
        current = match current {
            Value::Object(object) => object.entry(token.as_str()).or_insert_with(|| json!({})),
            Value::Array(items) => {
                let index = array_index(pointer, token, items.len())?;
                &mut items[index]
            }
            _ => return Err(PatchError::application(pointer, "parent is not a container")),
        };
    }

    match current {
        Value::Object(object) => {
            object.insert(last.clone(), value);
        }
        Value::Array(items) if last == "-" => items.push(value),
        Value::Array(items) => {
            let index = array_index(pointer, last, items.len() + 1)?;
            items.insert(index, value);
        }
        _ => return Err(PatchError::application(pointer, "parent is not a container")),
    }
    Ok(())
}

fn remove_value(document: &mut Value, pointer: &str, tokens: &[String]) -> PatchResult<()> {
    let Some((last, parents)) = tokens.split_last() else {
        return Err(PatchError::application(pointer, "cannot remove the document root"));
    };

    match navigate(document, pointer, parents)? {
        Value::Object(object) => object
            .remove(last)
            .map(|_| ())
            .ok_or_else(|| PatchError::application(pointer, "no such member")),
        Value::Array(items) => {
            let index = array_index(pointer, last, items.len())?;
            items.remove(index);
            Ok(())
        }
        _ => Err(PatchError::application(pointer, "parent is not a container")),
    }
}

/// Walk to an existing value.
fn navigate<'a>(
    document: &'a mut Value,
    pointer: &str,
    tokens: &[String],
) -> PatchResult<&'a mut Value> {
    let mut current = document;
    for token in tokens {
        current = match current {
            Value::Object(object) => object
                .get_mut(token)
                .ok_or_else(|| PatchError::application(pointer, "no such member"))?,
            Value::Array(items) => {
                let index = array_index(pointer, token, items.len())?;
                &mut items[index]
            }
            _ => return Err(PatchError::application(pointer, "path runs through a scalar")),
        };
    }
    Ok(current)
}

/// Parse an array index token, which must be below `bound`.
fn array_index(pointer: &str, token: &str, bound: usize) -> PatchResult<usize> {
    let well_formed = token == "0" || (!token.starts_with('0') && !token.is_empty());
    match token.parse::<usize>() {
        Ok(index) if well_formed && index < bound => Ok(index),
        _ => Err(PatchError::application(
            pointer,
            format!("'{}' is not a valid array index", token),
        )),
    }
}
