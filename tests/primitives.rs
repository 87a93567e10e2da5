use contract_case as cc;
use cc::matchers::*;
use cc::{AnyData, CaseNode, Engine, MatchBy, MatchConfig, MatchResult};
use serde_json::json;

async fn check(node: &CaseNode, actual: AnyData) -> MatchResult {
    cc::check_match(node, &actual).await.unwrap()
}

fn messages(result: &MatchResult) -> String {
    result.iter().map(|e| e.message().to_string()).collect::<Vec<_>>().join("\n")
}

#[tokio::test]
async fn test_any_number_accepts_any_number() {
    assert!(check(&any_number(1.1), AnyData::from(42i64)).await.is_empty());
    assert!(check(&any_number(1.1), AnyData::Number(-0.5)).await.is_empty());
}

#[tokio::test]
async fn test_any_number_rejects_other_types() {
    let result = check(&any_number(1.1), AnyData::from("1")).await;
    assert_eq!(result.len(), 1);
    assert!(messages(&result).contains("not a number"));
}

#[tokio::test]
async fn test_any_number_rejects_nan_under_json() {
    let result = check(&any_number(1.1), AnyData::Number(f64::NAN)).await;
    assert!(messages(&result).contains("NaN"));
}

#[tokio::test]
async fn test_any_number_rejects_infinity_under_json() {
    let result = check(&any_number(1.1), AnyData::Number(f64::INFINITY)).await;
    assert!(messages(&result).contains("finite"));
    let result = check(&any_number(1.1), AnyData::Number(f64::NEG_INFINITY)).await;
    assert!(messages(&result).contains("finite"));
}

#[tokio::test]
async fn test_any_integer_rejects_fractions() {
    let result = check(&any_integer(1), AnyData::Number(1.5)).await;
    assert_eq!(result.len(), 1);
    assert!(messages(&result).contains("Expected an integer"));
    assert!(check(&any_integer(1), AnyData::from(-7i64)).await.is_empty());
}

#[tokio::test]
async fn test_any_string_and_boolean_and_null() {
    assert!(check(&any_string("x"), AnyData::from("anything")).await.is_empty());
    assert!(messages(&check(&any_string("x"), AnyData::Bool(true)).await).contains("not a string"));
    assert!(check(&any_boolean(true), AnyData::Bool(false)).await.is_empty());
    assert!(messages(&check(&any_boolean(true), AnyData::from("true")).await).contains("not a boolean"));
    assert!(check(&any_null(), AnyData::Null).await.is_empty());
    assert!(messages(&check(&any_null(), AnyData::from(0i64)).await).contains("is not null"));
}

#[tokio::test]
async fn test_literal_reports_both_values_and_types() {
    let result = check(&CaseNode::from("1"), AnyData::from(1i64)).await;
    let text = messages(&result);
    assert!(text.contains("not exactly equal"));
    assert!(text.contains("(number)"));
    assert!(text.contains("(string)"));
    assert_eq!(result[0].expected(), &AnyData::from("1"));
}

#[tokio::test]
async fn test_literal_accepts_equal_value() {
    assert!(check(&CaseNode::from(json!(3)), AnyData::from(3i64)).await.is_empty());
    assert!(check(&CaseNode::Null, AnyData::Null).await.is_empty());
}

#[tokio::test]
async fn test_type_matching_relaxes_literals() {
    let engine = Engine::new(MatchConfig {
        match_by: MatchBy::Type,
        ..MatchConfig::default()
    });
    let node = CaseNode::from("expected");
    assert!(engine.check_match(&node, &AnyData::from("other")).await.unwrap().is_empty());
    let wrong_type = engine.check_match(&node, &AnyData::from(1i64)).await.unwrap();
    assert!(messages(&wrong_type).contains("not a string"));
}

#[tokio::test]
async fn test_exactly_like_escalates_any_leaves() {
    let shaped = any_string("hello");
    assert!(check(&shaped, AnyData::from("bye")).await.is_empty());
    let exact = exactly_like(any_string("hello"));
    let result = check(&exact, AnyData::from("bye")).await;
    assert!(messages(&result).contains("not exactly equal"));
}

#[tokio::test]
async fn test_http_status_classes_and_codes() {
    let matcher = http_status(["2XX", "404"]);
    assert!(check(&matcher, AnyData::from(204i64)).await.is_empty());
    assert!(check(&matcher, AnyData::from(404i64)).await.is_empty());
    let result = check(&matcher, AnyData::from(500i64)).await;
    assert_eq!(messages(&result), "'500' is not a 2XX or 404 status code");
    assert_eq!(cc::strip_matchers(&matcher).unwrap(), AnyData::from(200i64));
}

#[tokio::test]
async fn test_http_status_rejects_bad_codes_as_configuration() {
    let err = cc::check_match(&http_status(["99X"]), &AnyData::from(200i64))
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_leaves_strip_to_their_examples() {
    assert_eq!(cc::strip_matchers(&any_number(2.5)).unwrap(), AnyData::Number(2.5));
    assert_eq!(cc::strip_matchers(&any_integer(7)).unwrap(), AnyData::from(7i64));
    assert_eq!(cc::strip_matchers(&any_string("s")).unwrap(), AnyData::from("s"));
    assert_eq!(cc::strip_matchers(&any_boolean(false)).unwrap(), AnyData::Bool(false));
    assert_eq!(cc::strip_matchers(&any_null()).unwrap(), AnyData::Null);
}
