use futures::future::{BoxFuture, FutureExt};

use crate::context::{LogLevel, MatchContext};
use crate::errors::Result;
use crate::executors::executor_for;
use crate::matchers::{infer_matcher, CaseNode};
use crate::results::MatchResult;
use crate::value::AnyData;

// =========================
// Dispatcher
// =========================

/// The only place that recurses into child nodes: infer the matcher, fold a
/// child context for it, then hand off to its executor.
///
/// Boxed so executors can call back in without an infinitely sized future.
pub fn descend_and_check<'a>(
    node: &'a CaseNode,
    parent: &'a MatchContext,
    actual: &'a AnyData,
) -> BoxFuture<'a, Result<MatchResult>> {
    async move {
        let matcher = infer_matcher(node);
        let ctx = parent.fold(&matcher);
        if ctx.should_log(LogLevel::MaintainerDebug) {
            tracing::trace!(
                location = %ctx.location(),
                kind = %matcher.kind(),
                match_by = ?ctx.match_by(),
                "checking"
            );
        }
        let result = executor_for(&matcher).check(&ctx, actual).await?;
        if !result.is_empty() && ctx.should_log(LogLevel::Debug) {
            tracing::debug!(
                location = %ctx.location(),
                kind = %matcher.kind(),
                errors = result.len(),
                "mismatch"
            );
        }
        Ok(result)
    }
    .boxed()
}

/// Generates the example a node stands for. An explicit example supplied
/// with the matcher wins over one generated from its definition.
pub fn descend_and_strip(node: &CaseNode, parent: &MatchContext) -> Result<AnyData> {
    if let Some(example) = node.as_matcher().and_then(|m| m.explicit_example()) {
        return descend_and_strip(example, parent);
    }
    let matcher = infer_matcher(node);
    let ctx = parent.fold(&matcher);
    if ctx.should_log(LogLevel::MaintainerDebug) {
        tracing::trace!(location = %ctx.location(), kind = %matcher.kind(), "stripping");
    }
    executor_for(&matcher).strip(&ctx)
}

/// Strips `node` and checks the result against `node` itself. A non-empty
/// result means the matcher contradicts its own example.
pub fn self_verify<'a>(
    node: &'a CaseNode,
    parent: &'a MatchContext,
) -> BoxFuture<'a, Result<MatchResult>> {
    async move {
        let example = descend_and_strip(node, parent)?;
        descend_and_check(node, parent, &example).await
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MatchBy, MatchConfig};
    use crate::matchers::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn root() -> MatchContext {
        MatchContext::root(&MatchConfig::default())
    }

    fn check(node: &CaseNode, actual: serde_json::Value) -> MatchResult {
        block_on(descend_and_check(node, &root(), &AnyData::from(actual))).unwrap()
    }

    fn messages(result: &MatchResult) -> Vec<String> {
        result.iter().map(|e| e.message().to_string()).collect()
    }

    #[test]
    fn raw_data_matches_itself() {
        let node = CaseNode::from(json!({"a": [1, "x", null], "b": {"c": true}}));
        assert!(check(&node, json!({"a": [1, "x", null], "b": {"c": true}})).is_empty());
    }

    #[test]
    fn errors_come_back_in_declaration_order() {
        let node = CaseNode::from(json!({"first": 1, "second": "two", "third": false}));
        let result = check(&node, json!({"third": true, "second": "2", "first": 0}));
        let locations: Vec<_> = result.iter().map(|e| e.location().to_string()).collect();
        assert_eq!(locations, vec!["$.first", "$.second", "$.third"]);
    }

    #[test]
    fn every_failing_child_is_reported() {
        let node = shaped_like(json!({"a": 1, "b": "s", "c": true}));
        let result = check(&node, json!({"a": "1", "b": 2, "c": null}));
        assert_eq!(
            messages(&result),
            vec![
                "'string' is not a number",
                "'number' is not a string",
                "'null' is not a boolean",
            ]
        );
    }

    #[test]
    fn explicit_examples_win_when_stripping() {
        let node = array_each_entry_matches_with_example(any_string("x"), json!(["a", "b"]));
        assert_eq!(
            descend_and_strip(&node, &root()).unwrap(),
            AnyData::from(json!(["a", "b"]))
        );
    }

    #[test]
    fn shaped_like_inside_exactly_like_stays_exact() {
        let node = exactly_like(CaseNode::object([("a", shaped_like(1i64))]));
        let result = check(&node, json!({"a": 2}));
        assert_eq!(result.len(), 1);
        assert!(result[0].message().contains("not exactly equal"));
    }

    #[test]
    fn type_matching_at_the_root_ignores_values() {
        let ctx = MatchContext::root(&MatchConfig {
            match_by: MatchBy::Type,
            ..MatchConfig::default()
        });
        let node = CaseNode::from(json!({"a": 1, "b": ["x"]}));
        let actual = AnyData::from(json!({"a": 7, "b": ["y", "z"]}));
        assert!(block_on(descend_and_check(&node, &ctx, &actual)).unwrap().is_empty());
    }

    #[test]
    fn self_verify_passes_for_consistent_matchers() {
        let node = CaseNode::object([
            ("id", any_integer(12)),
            ("status", http_status(["2XX"])),
            ("tags", array_contains([any_string("red")])),
            ("attrs", object_each_value_matches(any_boolean(false))),
        ]);
        assert!(block_on(self_verify(&node, &root())).unwrap().is_empty());
    }
}
