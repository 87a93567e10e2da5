use contract_case as cc;
use cc::matchers::*;
use cc::{AnyData, CaseError, CaseNode, Engine, MatchConfig, MatchResult};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn check(node: &CaseNode, actual: serde_json::Value) -> MatchResult {
    cc::check_match(node, &AnyData::from(actual)).await.unwrap()
}

fn messages(result: &MatchResult) -> String {
    result.iter().map(|e| e.message().to_string()).collect::<Vec<_>>().join("\n")
}

#[tokio::test]
async fn test_shaped_like_permits_extra_keys() {
    let matcher = shaped_like(json!({"a": 1}));
    assert!(check(&matcher, json!({"a": 2, "b": "x"})).await.is_empty());
}

#[tokio::test]
async fn test_shaped_like_reports_missing_key() {
    let matcher = shaped_like(json!({"a": 1}));
    let result = check(&matcher, json!({"b": "x"})).await;
    assert_eq!(result.len(), 1);
    assert!(messages(&result).contains("missing key 'a'"));
    assert_eq!(result[0].location().to_string(), "$.a");
    assert_eq!(result[0].expected(), &AnyData::from(1i64));
}

#[tokio::test]
async fn test_exactly_like_requires_equal_values() {
    let matcher = exactly_like(json!({"a": 1}));
    let result = check(&matcher, json!({"a": 2})).await;
    assert!(messages(&result).contains("not exactly equal"));
}

#[tokio::test]
async fn test_exactly_like_closes_objects() {
    let matcher = exactly_like(json!({"a": 1}));
    let result = check(&matcher, json!({"a": 1, "b": 2})).await;
    assert_eq!(result.len(), 1);
    assert!(messages(&result).contains("unexpected key 'b'"));
}

#[tokio::test]
async fn test_exactly_like_can_be_left_open() {
    let engine = Engine::new(MatchConfig {
        exact_objects_closed: false,
        ..MatchConfig::default()
    });
    let matcher = exactly_like(json!({"a": 1}));
    let actual = AnyData::from(json!({"a": 1, "b": 2}));
    assert!(engine.check_match(&matcher, &actual).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_objects_are_described() {
    let matcher = shaped_like(json!({"a": 1}));
    assert_eq!(
        messages(&check(&matcher, json!(null)).await),
        "Expected an object, but it was null"
    );
    assert_eq!(
        messages(&check(&matcher, json!([1])).await),
        "Expected an object, but got an array"
    );
}

#[tokio::test]
async fn test_nested_errors_keep_paths_and_order() {
    let node = CaseNode::object([
        ("id", any_integer(1)),
        (
            "owner",
            CaseNode::object([("name", any_string("n")), ("email", any_string("e"))]),
        ),
    ]);
    let result = check(&node, json!({"id": "x", "owner": {"name": 1, "email": 2}})).await;
    let locations: Vec<String> = result.iter().map(|e| e.location().to_string()).collect();
    assert_eq!(locations, vec!["$.id", "$.owner.name", "$.owner.email"]);
}

#[tokio::test]
async fn test_object_each_key_rejects_empty_object() {
    let matcher = object_each_key_matches(any_string("k"));
    let result = check(&matcher, json!({})).await;
    assert!(messages(&result).contains("at least one key property"));
}

#[tokio::test]
async fn test_object_each_key_checks_every_key() {
    let matcher = object_each_key_matches(CaseNode::from("id"));
    assert!(check(&matcher, json!({"id": 1})).await.is_empty());
    let result = check(&matcher, json!({"id": 1, "name": 2})).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].location().to_string(), "$.name");
}

#[tokio::test]
async fn test_object_each_value_checks_every_value() {
    let matcher = object_each_value_matches(any_integer(1));
    assert!(check(&matcher, json!({"a": 1, "b": 2})).await.is_empty());
    let result = check(&matcher, json!({"a": 1, "b": "two"})).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].location().to_string(), "$.b");
    let not_object = check(&matcher, json!("nope")).await;
    assert!(messages(&not_object).contains("Expected an object, but got a string"));
}

#[test]
fn test_object_strips() {
    assert_eq!(
        cc::strip_matchers(&object_each_key_matches(any_string("id"))).unwrap(),
        AnyData::from(json!({"id": "someValue"}))
    );
    assert_eq!(
        cc::strip_matchers(&object_each_value_matches(any_integer(3))).unwrap(),
        AnyData::from(json!({"someKey": 3}))
    );
    assert_eq!(
        cc::strip_matchers(&object_each_value_matches_with_example(
            any_integer(3),
            json!({"x": 9})
        ))
        .unwrap(),
        AnyData::from(json!({"x": 9}))
    );
    assert_eq!(
        cc::strip_matchers(&shaped_like(CaseNode::object([("n", any_number(2.5))]))).unwrap(),
        AnyData::from(json!({"n": 2.5}))
    );
}

#[tokio::test]
async fn test_object_each_key_needs_a_string_key_example() {
    let numeric_keys = object_each_key_matches(any_integer(1));
    match cc::strip_matchers(&numeric_keys) {
        Err(CaseError::Configuration(msg)) => assert!(msg.contains("must resolve to a string"), "{msg}"),
        other => panic!("expected a configuration fault, got {other:?}"),
    }
    assert!(matches!(
        cc::self_verify(&numeric_keys).await,
        Err(CaseError::Configuration(_))
    ));
    assert!(cc::self_verify(&object_each_key_matches(any_string("id")))
        .await
        .unwrap()
        .is_empty());
}
