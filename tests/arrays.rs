use contract_case as cc;
use cc::matchers::*;
use cc::{AnyData, CaseError, CaseNode, MatchResult};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn check(node: &CaseNode, actual: serde_json::Value) -> MatchResult {
    cc::check_match(node, &AnyData::from(actual)).await.unwrap()
}

fn messages(result: &MatchResult) -> String {
    result.iter().map(|e| e.message().to_string()).collect::<Vec<_>>().join("\n")
}

#[tokio::test]
async fn test_array_length_default_minimum() {
    let matcher = array_length(ArrayLengthMatcher::default());
    assert!(messages(&check(&matcher, json!([])).await).contains("under the minimum length"));
    assert!(check(&matcher, json!([1])).await.is_empty());
}

#[tokio::test]
async fn test_array_length_maximum() {
    let matcher = array_length(ArrayLengthMatcher {
        min_length: None,
        max_length: Some(2),
    });
    assert!(messages(&check(&matcher, json!([1, 2, 3])).await).contains("over the maximum length"));
    assert!(check(&matcher, json!([1, 2])).await.is_empty());
}

#[test]
fn test_array_length_with_bounds_cannot_strip() {
    let matcher = array_length(ArrayLengthMatcher {
        min_length: Some(1),
        max_length: Some(3),
    });
    assert!(matches!(
        cc::strip_matchers(&matcher),
        Err(CaseError::StripUnsupported { .. })
    ));
}

#[tokio::test]
async fn test_array_contains_empty_array() {
    let result = check(&array_contains([1i64]), json!([])).await;
    assert!(messages(&result).contains("the array was empty"));
}

#[tokio::test]
async fn test_array_contains_finds_a_match() {
    assert!(check(&array_contains([1i64]), json!(["1", 1, 3])).await.is_empty());
}

#[tokio::test]
async fn test_array_contains_aggregates_every_entry_when_none_match() {
    let result = check(&array_contains([any_string("x")]), json!([1, true])).await;
    assert_eq!(result.len(), 1);
    let text = result[0].message();
    assert!(text.contains("[0] 'number' is not a string"));
    assert!(text.contains("[1] 'boolean' is not a string"));
}

#[tokio::test]
async fn test_array_contains_every_matcher_must_be_satisfied() {
    let matcher = array_contains([any_string("a"), any_integer(1)]);
    assert!(check(&matcher, json!(["z", 9])).await.is_empty());
    let result = check(&matcher, json!(["z", "y"])).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].location().to_string(), "$:arrayContains[1]");
}

#[tokio::test]
async fn test_array_each_entry_rejects_empty() {
    let result = check(&array_each_entry_matches(any_number(1.0)), json!([])).await;
    assert!(messages(&result).contains("Expected a non-empty array"));
}

#[tokio::test]
async fn test_array_each_entry_reports_every_failure_in_order() {
    let result = check(&array_each_entry_matches(any_number(1.0)), json!([1, "a", 2, null])).await;
    let locations: Vec<String> = result.iter().map(|e| e.location().to_string()).collect();
    assert_eq!(locations, vec!["$[1]", "$[3]"]);
}

#[tokio::test]
async fn test_non_arrays_are_rejected() {
    let result = check(&array_each_entry_matches(any_number(1.0)), json!({"a": 1})).await;
    assert!(messages(&result).contains("is not an array"));
}

#[tokio::test]
async fn test_array_starts_with_checks_prefix() {
    let matcher = array_starts_with([any_string("a"), CaseNode::from(2i64)]);
    assert!(check(&matcher, json!(["z", 2, "extra"])).await.is_empty());
    let short = check(&matcher, json!(["z"])).await;
    assert_eq!(short.len(), 1);
    assert!(messages(&short).contains("Array has different lengths"));
}

#[tokio::test]
async fn test_raw_arrays_are_checked_index_by_index() {
    let node = CaseNode::from(json!([1, "two"]));
    assert!(check(&node, json!([1, "two"])).await.is_empty());
    let longer = check(&node, json!([1, "two", 3])).await;
    assert!(messages(&longer).contains("Array has different lengths"));
    let shaped = shaped_like(json!([1, "two"]));
    assert!(check(&shaped, json!([5, "x", true])).await.is_empty());
}

#[test]
fn test_array_strips() {
    assert_eq!(
        cc::strip_matchers(&array_each_entry_matches(any_integer(4))).unwrap(),
        AnyData::from(json!([4]))
    );
    assert_eq!(
        cc::strip_matchers(&array_contains([any_string("a"), any_boolean(true)])).unwrap(),
        AnyData::from(json!(["a", true]))
    );
    assert_eq!(
        cc::strip_matchers(&array_starts_with([CaseNode::from(1i64)])).unwrap(),
        AnyData::from(json!([1]))
    );
    assert_eq!(
        cc::strip_matchers(&array_length(ArrayLengthMatcher::default())).unwrap(),
        AnyData::from(json!([null]))
    );
}

#[tokio::test]
async fn test_empty_matcher_lists_are_configuration_faults() {
    let contains = cc::self_verify(&array_contains(Vec::<CaseNode>::new())).await;
    assert!(matches!(contains, Err(CaseError::Configuration(_))), "got {contains:?}");
    let starts_with = cc::check_match(
        &array_starts_with(Vec::<CaseNode>::new()),
        &AnyData::from(json!([1])),
    )
    .await;
    assert!(matches!(starts_with, Err(CaseError::Configuration(_))), "got {starts_with:?}");
}

#[tokio::test]
async fn test_exactly_like_array_rejects_extra_entries_as_not_exact() {
    let shaped = shaped_like(json!([1]));
    assert!(check(&shaped, json!([1, 2])).await.is_empty());
    let exact = check(&exactly_like(json!([1])), json!([1, 2])).await;
    assert_eq!(exact.len(), 1);
    assert!(messages(&exact).contains("not exactly equal"));
}
