//! Property-based tests for filter parsing, rendering and PATCH removal ordering.
//!
//! Uses proptest to generate random well-formed filters and multi-valued
//! attributes, with automatic shrinking on failure.

use crate::common::fixtures::rfc_examples;
use proptest::prelude::*;
use scim_filter_patch::{ScimPatchOperation, apply, convert, matches, parse, render};
use serde_json::{Value, json};

/// Strategy for attribute paths found on the example User
fn attribute_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "userName",
        "title",
        "name.givenName",
        "emails.value",
        "emails.type",
        "active",
        "meta.lastModified",
        "urn:ietf:params:scim:schemas:core:2.0:User:displayName",
    ])
    .prop_map(str::to_string)
}

/// Strategy for a single attribute expression with a legal operator/value pairing
fn term_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        attribute_strategy().prop_map(|attribute| format!("{} pr", attribute)),
        (
            attribute_strategy(),
            prop::sample::select(vec!["eq", "ne", "co", "sw", "ew", "gt", "ge", "lt", "le"]),
            "[a-zA-Z0-9 @.]{0,12}",
        )
            .prop_map(|(attribute, op, text)| format!("{} {} \"{}\"", attribute, op, text)),
        (
            attribute_strategy(),
            prop::sample::select(vec!["eq", "ne", "gt", "ge", "lt", "le"]),
            -10_000i64..10_000,
        )
            .prop_map(|(attribute, op, number)| format!("{} {} {}", attribute, op, number)),
        (
            attribute_strategy(),
            prop::sample::select(vec!["eq", "ne"]),
            any::<bool>(),
        )
            .prop_map(|(attribute, op, flag)| format!("{} {} {}", attribute, op, flag)),
        (attribute_strategy(), prop::sample::select(vec!["eq", "ne"]))
            .prop_map(|(attribute, op)| format!("{} {} null", attribute, op)),
        (
            attribute_strategy(),
            prop::sample::select(vec!["eq", "ne", "gt", "ge", "lt", "le"]),
            0u32..86_400,
        )
            .prop_map(|(attribute, op, seconds)| format!(
                "{} {} \"2011-05-13T{:02}:{:02}:{:02}Z\"",
                attribute,
                op,
                seconds / 3600,
                seconds / 60 % 60,
                seconds % 60
            )),
    ]
}

/// Strategy for filters combining terms with logical operators, groups and negation
fn filter_strategy() -> impl Strategy<Value = String> {
    term_strategy().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!["and", "or"]),
                inner.clone()
            )
                .prop_map(|(left, op, right)| format!("{} {} {}", left, op, right)),
            inner.clone().prop_map(|filter| format!("not ({})", filter)),
            inner.clone().prop_map(|filter| format!("({})", filter)),
            inner.prop_map(|filter| format!("emails[{}]", filter)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_parse_is_idempotent(filter in filter_strategy()) {
        let first = parse(&filter).unwrap();
        let second = parse(&filter).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_display_round_trips(filter in filter_strategy()) {
        let expression = parse(&filter).unwrap();
        let reparsed = parse(&expression.to_string()).unwrap();
        prop_assert_eq!(expression, reparsed);
    }

    #[test]
    fn prop_render_is_stable(filter in filter_strategy()) {
        let expression = parse(&filter).unwrap();
        let first = render(&expression).unwrap();
        prop_assert_eq!(&first, &render(&parse(&filter).unwrap()).unwrap());
        prop_assert!(!first.contains('\n'));
    }

    #[test]
    fn prop_legal_filters_always_evaluate(filter in filter_strategy()) {
        let expression = parse(&filter).unwrap();
        prop_assert!(matches(&expression, &rfc_examples::user_full()).is_ok());
        let empty = json!({});
        prop_assert!(matches(&expression, &empty).is_ok());
    }

    #[test]
    fn prop_filtered_removals_descend(
        types in prop::collection::vec(prop::sample::select(vec!["work", "home", "other"]), 0..12),
        target in prop::sample::select(vec!["work", "home", "other"]),
    ) {
        let emails: Vec<Value> = types
            .iter()
            .enumerate()
            .map(|(index, kind)| json!({"type": kind, "value": format!("user{}@example.com", index)}))
            .collect();
        let user = json!({"emails": emails});
        let path = format!("emails[type eq \"{}\"]", target);

        let patch = convert(&[ScimPatchOperation::remove(&path)], &user).unwrap();
        let indices: Vec<usize> = patch
            .iter()
            .map(|op| op.path.trim_start_matches("/emails/").parse().unwrap())
            .collect();
        let expected: Vec<usize> = types
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, kind)| **kind == target)
            .map(|(index, _)| index)
            .collect();
        prop_assert_eq!(&indices, &expected);

        let mut result = user.clone();
        apply(&mut result, &patch).unwrap();
        let remaining = result["emails"].as_array().unwrap();
        prop_assert_eq!(remaining.len(), types.len() - expected.len());
        prop_assert!(remaining.iter().all(|email| email["type"] != target));
    }

    #[test]
    fn prop_removals_across_operations_apply_cleanly(
        values in prop::collection::vec(0u8..6, 1..10),
        removed in prop::collection::vec(0u8..6, 1..4),
    ) {
        let members: Vec<Value> = values.iter().map(|value| json!({"value": value.to_string()})).collect();
        let group = json!({"members": members});
        let operations: Vec<ScimPatchOperation> = removed
            .iter()
            .map(|value| ScimPatchOperation::remove(&format!("members[value eq \"{}\"]", value)))
            .collect();

        let patch = convert(&operations, &group).unwrap();
        let mut result = group.clone();
        apply(&mut result, &patch).unwrap();

        let expected: Vec<Value> = values
            .iter()
            .filter(|value| !removed.contains(value))
            .map(|value| json!({"value": value.to_string()}))
            .collect();
        prop_assert_eq!(&result["members"], &Value::Array(expected));
    }
}
