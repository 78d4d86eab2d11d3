//! SCIM PATCH conversion, checked both by the generated JSON Patch and by
//! applying it to the RFC 7643 example resources.

use crate::common::fixtures::rfc_examples;
use crate::common::init_logging;
use scim_filter_patch::{
    JsonPatchOperation, PatchConverter, PatchError, PatchOp, PatchRequest, ScimPatchOperation,
    apply, convert,
};
use serde_json::{Value, json};

fn user_with_two_work_emails() -> Value {
    let mut user = rfc_examples::user_full();
    user["emails"] = json!([
        {"value": "bjensen@example.com", "type": "work", "primary": true},
        {"value": "babs@jensen.org", "type": "home"},
        {"value": "barbara@example.com", "type": "work"}
    ]);
    user
}

fn request(operations: Value) -> PatchRequest {
    PatchRequest::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": operations
    }))
    .unwrap()
}

fn patched(document: &Value, operations: Value) -> Value {
    let request = request(operations);
    let patch = PatchConverter::new()
        .convert_request(&request, document)
        .unwrap();
    let mut result = document.clone();
    apply(&mut result, &patch).unwrap();
    result
}

#[test]
fn test_filtered_path_expands_per_matching_element() {
    init_logging();
    let user = user_with_two_work_emails();
    let operations = [ScimPatchOperation::replace(
        Some("emails[type eq \"work\"].value"),
        json!("tour@example.com"),
    )];

    let patch = convert(&operations, &user).unwrap();
    assert_eq!(
        patch,
        vec![
            JsonPatchOperation::replace("/emails/0/value", json!("tour@example.com")),
            JsonPatchOperation::replace("/emails/2/value", json!("tour@example.com")),
        ]
    );
}

#[test]
fn test_removals_are_emitted_in_descending_index_order() {
    let user = user_with_two_work_emails();
    let operations = [
        ScimPatchOperation::remove("emails[type eq \"work\"]"),
        ScimPatchOperation::remove("emails[type eq \"home\"]"),
    ];

    let patch = convert(&operations, &user).unwrap();
    let paths: Vec<_> = patch.iter().map(|op| op.path.as_str()).collect();
    assert_eq!(paths, ["/emails/2", "/emails/1", "/emails/0"]);
    assert!(patch.iter().all(|op| op.op == PatchOp::Remove));

    let mut result = user.clone();
    apply(&mut result, &patch).unwrap();
    assert_eq!(result["emails"], json!([]));
}

#[test]
fn test_group_membership_changes() {
    let group = rfc_examples::group_basic();
    let result = patched(
        &group,
        json!([
            {
                "op": "add",
                "path": "members",
                "value": [
                    {"value": "c3a26dd3-27a0-4dec-a2ac-ce211e105f97", "display": "Tour Guide 3"}
                ]
            },
            {"op": "remove", "path": "members[value eq \"2819c223-7f76-453a-919d-413861904646\"]"},
            {"op": "replace", "path": "displayName", "value": "Tour Staff"}
        ]),
    );

    assert_eq!(result["displayName"], "Tour Staff");
    let members: Vec<_> = result["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        members,
        [
            "902c246b-6245-4190-8e05-00816be7344a",
            "c3a26dd3-27a0-4dec-a2ac-ce211e105f97"
        ]
    );
}

#[test]
fn test_legacy_member_removal_by_value() {
    let group = rfc_examples::group_basic();
    let result = patched(
        &group,
        json!([{
            "op": "Remove",
            "path": "members",
            "value": [{"value": "902c246b-6245-4190-8e05-00816be7344a"}]
        }]),
    );
    assert_eq!(result["members"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        result["members"][0]["value"],
        "2819c223-7f76-453a-919d-413861904646"
    );
}

#[test]
fn test_whole_attribute_removal_alongside_member_removals() {
    init_logging();
    let group = rfc_examples::group_basic();
    let result = patched(
        &group,
        json!([
            {"op": "remove", "path": "members[value eq \"902c246b-6245-4190-8e05-00816be7344a\"]"},
            {"op": "remove", "path": "members"},
            {"op": "replace", "path": "displayName", "value": "Former Tour Guides"}
        ]),
    );
    assert!(result.get("members").is_none());
    assert_eq!(result["displayName"], "Former Tour Guides");
}

#[test]
fn test_member_removal_by_numeric_value() {
    let document: Value =
        serde_json::from_str(r#"{"members": [{"value": 1.0}, {"value": 2}]}"#).unwrap();
    let result = patched(
        &document,
        json!([{"op": "remove", "path": "members", "value": {"value": 1}}]),
    );
    assert_eq!(result["members"], json!([{"value": 2}]));
}

#[test]
fn test_pathless_replace_of_user_attributes() {
    let user = rfc_examples::user_enterprise();
    let result = patched(
        &user,
        json!([{
            "op": "replace",
            "value": {
                "active": false,
                "nickName": "Barb",
                "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                    "employeeNumber": "42"
                }
            }
        }]),
    );
    assert_eq!(result["active"], false);
    assert_eq!(result["nickName"], "Barb");
    assert_eq!(
        result["urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"],
        json!({"employeeNumber": "42"})
    );
}

#[test]
fn test_extension_attribute_paths() {
    let user = rfc_examples::user_enterprise();
    let result = patched(
        &user,
        json!([
            {
                "op": "replace",
                "path": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName",
                "value": "Jane Smith"
            },
            {
                "op": "remove",
                "path": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:costCenter"
            }
        ]),
    );
    let extension = &result["urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"];
    assert_eq!(extension["manager"]["displayName"], "Jane Smith");
    assert!(extension.get("costCenter").is_none());
    assert_eq!(extension["employeeNumber"], "701984");
}

#[test]
fn test_adding_to_missing_complex_attribute() {
    let user = rfc_examples::user_minimal();
    let result = patched(
        &user,
        json!([
            {"op": "add", "path": "name.givenName", "value": "Barbara"},
            {"op": "replace", "path": "name.familyName", "value": "Jensen"}
        ]),
    );
    assert_eq!(result["name"], json!({"givenName": "Barbara", "familyName": "Jensen"}));
}

#[test]
fn test_filtered_sub_attribute_add_and_remove() {
    let user = rfc_examples::user_full();
    let result = patched(
        &user,
        json!([
            {"op": "add", "path": "emails[type eq \"home\"].display", "value": "Babs at home"},
            {"op": "remove", "path": "emails[type eq \"work\"].primary"},
            {"op": "replace", "path": "addresses[type eq \"home\"].postalCode", "value": "90210"}
        ]),
    );
    assert_eq!(result["emails"][1]["display"], "Babs at home");
    assert!(result["emails"][0].get("primary").is_none());
    assert_eq!(result["addresses"][1]["postalCode"], "90210");
    assert_eq!(result["addresses"][0]["postalCode"], "91608");
}

#[test]
fn test_unmatched_filter_produces_no_operations() {
    let user = rfc_examples::user_full();
    let operations = [ScimPatchOperation::replace(
        Some("emails[type eq \"other\"].value"),
        json!("x"),
    )];
    assert!(convert(&operations, &user).unwrap().is_empty());
}

#[test]
fn test_malformed_path_fails_whole_batch() {
    let user = rfc_examples::user_full();
    let operations = [
        ScimPatchOperation::replace(Some("displayName"), json!("Babs")),
        ScimPatchOperation::replace(Some("emails[type eq \"work\".value"), json!("x")),
    ];
    crate::assert_error_variant!(
        convert(&operations, &user),
        PatchError::MalformedPatchPath { .. }
    );
}

#[test]
fn test_request_validation() {
    let result = PatchRequest::from_value(json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "Operations": [{"op": "add", "path": "title", "value": "x"}]
    }));
    crate::assert_error_variant!(result, PatchError::InvalidPatchRequest { .. });

    let result = PatchRequest::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [{"op": "move", "from": "title", "path": "nickName"}]
    }));
    crate::assert_error_variant!(result, PatchError::InvalidPatchRequest { .. });
}

#[test]
fn test_output_serializes_as_json_patch() {
    let user = user_with_two_work_emails();
    let operations = [
        ScimPatchOperation::remove("emails[type eq \"work\"]"),
        ScimPatchOperation::add(Some("title"), json!("Lead Guide")),
    ];
    let patch = convert(&operations, &user).unwrap();
    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!([
            {"op": "add", "path": "/title", "value": "Lead Guide"},
            {"op": "remove", "path": "/emails/2"},
            {"op": "remove", "path": "/emails/0"}
        ])
    );
}
