//! Conversion of SCIM PATCH operations into JSON Patch.
//!
//! Each SCIM operation expands into zero or more JSON Patch operations whose
//! pointers are resolved against the document being patched. Removals of
//! array elements are staged and emitted last, grouped by array and in
//! descending index order, so every pointer in the output refers to the
//! position the element had in the original document when the output is
//! applied in sequence.

use crate::config::EngineConfig;
use crate::error::{PatchError, PatchResult};
use crate::filter::matcher::decimal_of;
use crate::filter::{
    AttributePath, CompareOperator, CompareValue, Expression, FilterMatcher, validate,
};
use crate::patch::operation::{JsonPatchOperation, PatchOp, PatchRequest, ScimPatchOperation};
use crate::patch::path::{PatchPath, join_pointer, pointer_tokens, to_pointer};
use log::debug;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Converts SCIM PATCH operations into JSON Patch operations.
///
/// # Examples
///
/// ```rust
/// use scim_filter_patch::patch::{PatchConverter, ScimPatchOperation};
/// use serde_json::json;
///
/// let user = json!({
///     "emails": [
///         {"type": "work", "value": "bjensen@example.com"},
///         {"type": "home", "value": "babs@jensen.org"}
///     ]
/// });
/// let operations = vec![ScimPatchOperation::replace(
///     Some("emails[type eq \"home\"].value"),
///     json!("barbara@jensen.org"),
/// )];
///
/// let patch = PatchConverter::new().convert(&operations, &user).unwrap();
/// assert_eq!(patch[0].path, "/emails/1/value");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatchConverter {
    matcher: FilterMatcher,
}

impl PatchConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            matcher: FilterMatcher::with_config(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.matcher.config()
    }

    /// Convert a batch of operations against `document`.
    ///
    /// The document is only read. Conversion is all or nothing: the first
    /// operation that cannot be converted fails the whole batch.
    ///
    /// # Errors
    ///
    /// * [`PatchError::MalformedPatchPath`] for an unparsable path, or a
    ///   remove without a path
    /// * [`PatchError::MissingValue`] for an add or replace without a value
    /// * [`PatchError::Filter`] when a path filter pairs an operator with an
    ///   unsupported value type
    pub fn convert(
        &self,
        operations: &[ScimPatchOperation],
        document: &Value,
    ) -> PatchResult<Vec<JsonPatchOperation>> {
        let mut conversion = Conversion::default();
        for operation in operations {
            let before = conversion.produced();
            self.convert_operation(operation, document, &mut conversion)?;
            debug!(
                "SCIM {} on {:?} expanded into {} JSON Patch operation(s)",
                operation.op,
                operation.path,
                conversion.produced() - before
            );
        }
        Ok(conversion.finish())
    }

    /// Validate a request envelope and convert its operations.
    pub fn convert_request(
        &self,
        request: &PatchRequest,
        document: &Value,
    ) -> PatchResult<Vec<JsonPatchOperation>> {
        request.validate()?;
        self.convert(&request.operations, document)
    }

    fn convert_operation(
        &self,
        operation: &ScimPatchOperation,
        document: &Value,
        out: &mut Conversion,
    ) -> PatchResult<()> {
        if operation.op != PatchOp::Remove {
            operation.required_value()?;
        }

        let Some(text) = operation.path.as_deref().filter(|text| !text.is_empty()) else {
            debug!("{} without a path targets the resource root", operation.op);
            return self.convert_root(operation, document, out);
        };

        match PatchPath::parse(text)? {
            PatchPath::Attribute(attribute) => {
                debug!("{} on attribute path '{}'", operation.op, attribute);
                self.convert_attribute(operation, &attribute, document, out)
            }
            PatchPath::Filtered {
                attribute,
                filter,
                sub_attribute,
            } => {
                debug!("{} on filtered path '{}'", operation.op, text);
                let target = FilteredTarget {
                    text,
                    attribute: &attribute,
                    filter: &filter,
                    sub_attribute: sub_attribute.as_ref(),
                };
                self.convert_filtered(operation, &target, document, out)
            }
        }
    }

    fn convert_root(
        &self,
        operation: &ScimPatchOperation,
        document: &Value,
        out: &mut Conversion,
    ) -> PatchResult<()> {
        match (operation.op, operation.required_value()) {
            (PatchOp::Remove, _) => Err(PatchError::malformed_path("", "remove requires a path")),
            (op, Ok(Value::Object(fields))) => {
                self.push_fields(out, op, "", document.as_object(), fields);
                Ok(())
            }
            (PatchOp::Add, Ok(value)) => {
                out.push(JsonPatchOperation::add("/", value.clone()));
                Ok(())
            }
            (_, Ok(_)) => Err(PatchError::InvalidPatchRequest {
                message: "replace without a path requires an object value".to_string(),
            }),
            (_, Err(error)) => Err(error),
        }
    }

    fn convert_attribute(
        &self,
        operation: &ScimPatchOperation,
        attribute: &AttributePath,
        document: &Value,
        out: &mut Conversion,
    ) -> PatchResult<()> {
        let tokens = pointer_tokens(self.config(), document, attribute);
        if tokens.is_empty() {
            // A core schema URN on its own names the resource itself
            return self.convert_root(operation, document, out);
        }
        let pointer = to_pointer(&tokens);
        let target = document.pointer(&pointer);

        match operation.op {
            PatchOp::Add => self.push_add(out, &pointer, target, operation.required_value()?),
            PatchOp::Replace => push_replace(out, &pointer, target, operation.required_value()?),
            PatchOp::Remove => match (target, &operation.value) {
                (None, _) => debug!("nothing to remove at {}", pointer),
                (Some(Value::Array(items)), Some(criteria)) => {
                    self.stage_matching_elements(out, &pointer, items, criteria)
                }
                (Some(_), _) => out.push(JsonPatchOperation::remove(pointer)),
            },
        }
        Ok(())
    }

    fn convert_filtered(
        &self,
        operation: &ScimPatchOperation,
        target: &FilteredTarget<'_>,
        document: &Value,
        out: &mut Conversion,
    ) -> PatchResult<()> {
        validate(target.filter)?;

        let pointer = to_pointer(&pointer_tokens(self.config(), document, target.attribute));
        let mut elements = Vec::new();
        match document.pointer(&pointer) {
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if self.matcher.matches(target.filter, item)? {
                        elements.push((Some(index), item));
                    }
                }
            }
            Some(single @ Value::Object(_)) => {
                if self.matcher.matches(target.filter, single)? {
                    elements.push((None, single));
                }
            }
            _ => {}
        }
        if elements.is_empty() {
            debug!("filter '{}' matched no element of {}", target.filter, pointer);
        }

        for (index, element) in elements {
            let element_pointer = match index {
                Some(index) => join_pointer(&pointer, &index.to_string()),
                None => pointer.clone(),
            };
            let Some(sub_attribute) = target.sub_attribute else {
                match operation.op {
                    PatchOp::Remove => match index {
                        Some(index) => out.stage_removal(&pointer, index),
                        None => out.push(JsonPatchOperation::remove(element_pointer)),
                    },
                    PatchOp::Add => match operation.required_value()? {
                        Value::Object(fields) => self.push_fields(
                            out,
                            PatchOp::Add,
                            &element_pointer,
                            element.as_object(),
                            fields,
                        ),
                        _ => {
                            return Err(PatchError::malformed_path(
                                target.text,
                                "add to a filtered element requires an object value or a sub-attribute",
                            ));
                        }
                    },
                    PatchOp::Replace => out.push(JsonPatchOperation::replace(
                        element_pointer,
                        operation.required_value()?.clone(),
                    )),
                }
                continue;
            };

            let relative = to_pointer(&pointer_tokens(self.config(), element, sub_attribute));
            let sub_target = element.pointer(&relative);
            let sub_pointer = format!("{}{}", element_pointer, relative);
            match operation.op {
                PatchOp::Add => {
                    self.push_add(out, &sub_pointer, sub_target, operation.required_value()?)
                }
                PatchOp::Replace => {
                    push_replace(out, &sub_pointer, sub_target, operation.required_value()?)
                }
                PatchOp::Remove if sub_target.is_some() => {
                    out.push(JsonPatchOperation::remove(sub_pointer))
                }
                PatchOp::Remove => debug!("nothing to remove at {}", sub_pointer),
            }
        }
        Ok(())
    }

    /// Add `value` at `pointer`: appended when the target is multi-valued,
    /// merged field by field when both target and value are objects.
    fn push_add(
        &self,
        out: &mut Conversion,
        pointer: &str,
        target: Option<&Value>,
        value: &Value,
    ) {
        match (target, value) {
            (Some(Value::Array(_)), Value::Array(items)) => {
                let append = join_pointer(pointer, "-");
                for item in items {
                    out.push(JsonPatchOperation::add(append.clone(), item.clone()));
                }
            }
            (Some(Value::Array(_)), value) => {
                out.push(JsonPatchOperation::add(join_pointer(pointer, "-"), value.clone()))
            }
            (Some(Value::Object(existing)), Value::Object(fields)) => {
                self.push_fields(out, PatchOp::Add, pointer, Some(existing), fields)
            }
            (_, value) => out.push(JsonPatchOperation::add(pointer, value.clone())),
        }
    }

    /// One operation per field of `fields` under `base`, reusing the keys
    /// already present in `existing`. Replacing an absent field adds it.
    fn push_fields(
        &self,
        out: &mut Conversion,
        op: PatchOp,
        base: &str,
        existing: Option<&Map<String, Value>>,
        fields: &Map<String, Value>,
    ) {
        for (field, value) in fields {
            let key = existing.and_then(|object| self.config().find_key(object, field));
            let op = match (op, key) {
                (PatchOp::Replace, None) => PatchOp::Add,
                (op, _) => op,
            };
            out.push(JsonPatchOperation {
                op,
                path: join_pointer(base, key.map_or(field.as_str(), String::as_str)),
                value: Some(value.clone()),
            });
        }
    }

    /// Legacy removal by value: stage every element equal to one of the
    /// `criteria`. An object criterion is an implicit `eq` filter on each of
    /// its fields, joined by `and`.
    fn stage_matching_elements(
        &self,
        out: &mut Conversion,
        pointer: &str,
        items: &[Value],
        criteria: &Value,
    ) {
        let criteria: Vec<&Value> = match criteria {
            Value::Array(criteria) => criteria.iter().collect(),
            criterion => vec![criterion],
        };
        for (index, item) in items.iter().enumerate() {
            if criteria
                .iter()
                .any(|criterion| self.element_matches(item, criterion))
            {
                out.stage_removal(pointer, index);
            }
        }
    }

    fn element_matches(&self, item: &Value, criterion: &Value) -> bool {
        match (item, criterion) {
            (Value::Object(object), Value::Object(fields)) => {
                !fields.is_empty()
                    && fields.iter().all(|(field, expected)| {
                        let path = AttributePath::new(None, vec![field.clone()]);
                        match equality_filter(path, expected) {
                            Some(filter) => self.matcher.matches(&filter, item).unwrap_or(false),
                            None => {
                                self.config()
                                    .find_key(object, field)
                                    .and_then(|key| object.get(key))
                                    == Some(expected)
                            }
                        }
                    })
            }
            (Value::Number(_), Value::Number(_)) => {
                decimal_of(item).is_some_and(|actual| Some(actual) == decimal_of(criterion))
            }
            (item, criterion) => item == criterion,
        }
    }
}

/// The `eq` filter a removal criterion field stands for. Nested values have
/// no filter form and are compared structurally by the caller.
fn equality_filter(path: AttributePath, expected: &Value) -> Option<Expression> {
    let value = match expected {
        Value::Null => return Some(Expression::null(path, CompareOperator::Equal)),
        Value::String(text) => CompareValue::Text(text.clone()),
        Value::Bool(flag) => CompareValue::Boolean(*flag),
        Value::Number(_) => CompareValue::Number(decimal_of(expected)?),
        Value::Array(_) | Value::Object(_) => return None,
    };
    Some(Expression::comparison(path, CompareOperator::Equal, value))
}

fn push_replace(out: &mut Conversion, pointer: &str, target: Option<&Value>, value: &Value) {
    if target.is_some() {
        out.push(JsonPatchOperation::replace(pointer, value.clone()));
    } else {
        debug!("replace target {} is absent, adding instead", pointer);
        out.push(JsonPatchOperation::add(pointer, value.clone()));
    }
}

/// Convert `operations` against `document` with the default configuration.
pub fn convert(
    operations: &[ScimPatchOperation],
    document: &Value,
) -> PatchResult<Vec<JsonPatchOperation>> {
    PatchConverter::new().convert(operations, document)
}

struct FilteredTarget<'a> {
    text: &'a str,
    attribute: &'a AttributePath,
    filter: &'a Expression,
    sub_attribute: Option<&'a AttributePath>,
}

/// Output under construction.
#[derive(Default)]
struct Conversion {
    operations: Vec<JsonPatchOperation>,
    // (array pointer, index) ordered by pointer, then index descending
    removals: BTreeSet<(String, Reverse<usize>)>,
}

impl Conversion {
    fn push(&mut self, operation: JsonPatchOperation) {
        self.operations.push(operation);
    }

    fn stage_removal(&mut self, array_pointer: &str, index: usize) {
        self.removals
            .insert((array_pointer.to_string(), Reverse(index)));
    }

    fn produced(&self) -> usize {
        self.operations.len() + self.removals.len()
    }

    /// Emit staged removals after everything else. Removals inside an array
    /// that another operation removes or replaces outright are dropped, since
    /// their indices no longer address the original elements.
    fn finish(self) -> Vec<JsonPatchOperation> {
        let mut operations = self.operations;
        let superseded: Vec<String> = operations
            .iter()
            .filter(|operation| operation.op != PatchOp::Add)
            .map(|operation| operation.path.clone())
            .collect();

        let removals: Vec<JsonPatchOperation> = self
            .removals
            .into_iter()
            .filter(|(array, Reverse(index))| {
                let covered = superseded
                    .iter()
                    .any(|pointer| contains_pointer(pointer, array));
                if covered {
                    debug!("removal of {}/{} is covered by a whole-array operation", array, index);
                }
                !covered
            })
            .map(|(array, Reverse(index))| {
                JsonPatchOperation::remove(join_pointer(&array, &index.to_string()))
            })
            .collect();
        operations.extend(removals);
        operations
    }
}

/// Whether `pointer` is `ancestor` itself or lies below it.
fn contains_pointer(ancestor: &str, pointer: &str) -> bool {
    pointer
        .strip_prefix(ancestor)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
