use async_trait::async_trait;

use super::{check_all, expected_example, MatcherExecutor};
use crate::context::MatchContext;
use crate::errors::{CaseError, Result};
use crate::matchers::{
    CascadingMatcher, MatcherKind, ObjectEachKeyMatcher, ObjectEachValueMatcher,
    ShapedObjectMatcher,
};
use crate::results::{combine_results, make_results, MatchResult, MatchingError};
use crate::value::{quoted_keys, AnyData};

const EACH_KEY_PLACEHOLDER_VALUE: &str = "someValue";
const EACH_VALUE_PLACEHOLDER_KEY: &str = "someKey";

fn why_not_an_object(actual: &AnyData) -> String {
    match actual {
        AnyData::Null => "Expected an object, but it was null".to_string(),
        other => format!("Expected an object, but got {}", other.described_type()),
    }
}

/// Returns the object's fields, or the error explaining why it isn't one.
fn require_object<'a>(
    kind: MatcherKind,
    expected: impl FnOnce() -> AnyData,
    ctx: &MatchContext,
    actual: &'a AnyData,
) -> std::result::Result<&'a [(String, AnyData)], MatchResult> {
    actual.as_object().ok_or_else(|| {
        make_results(MatchingError::new(
            kind,
            why_not_an_object(actual),
            expected(),
            actual,
            ctx,
        ))
    })
}

#[async_trait]
impl MatcherExecutor for CascadingMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        ctx.descend_and_check(&self.example, actual).await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        ctx.descend_and_strip(&self.example)
    }
}

impl ShapedObjectMatcher {
    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    fn expected_shape(&self, ctx: &MatchContext) -> AnyData {
        self.strip(ctx).unwrap_or_else(|_| {
            AnyData::String(format!(
                "an object with keys {}",
                quoted_keys(self.fields.iter().map(|(k, _)| k))
            ))
        })
    }
}

#[async_trait]
impl MatcherExecutor for ShapedObjectMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ShapedObject;
        let actual_fields = match require_object(kind, || self.expected_shape(ctx), ctx, actual) {
            Ok(fields) => fields,
            Err(errors) => return Ok(errors),
        };

        let field_checks = check_all(self.fields.iter().map(|(key, node)| {
            let field_ctx = ctx.add_location(key.as_str());
            async move {
                match actual.get(key) {
                    Some(value) => field_ctx.descend_and_check(node, value).await,
                    None => Ok(make_results(MatchingError::new(
                        kind,
                        format!("Object is missing key '{key}'"),
                        expected_example(&field_ctx, node),
                        &AnyData::Null,
                        &field_ctx,
                    ))),
                }
            }
        }))
        .await?;

        let unexpected = if ctx.rejects_unexpected_keys() {
            actual_fields
                .iter()
                .filter(|(key, _)| !self.declares(key))
                .map(|(key, value)| {
                    MatchingError::new(
                        kind,
                        format!(
                            "Object has unexpected key '{key}' (expected only {})",
                            quoted_keys(self.fields.iter().map(|(k, _)| k))
                        ),
                        AnyData::Null,
                        value,
                        &ctx.add_location(key.as_str()),
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(combine_results([field_checks, unexpected]))
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        self.fields
            .iter()
            .map(|(key, node)| {
                ctx.add_location(key.as_str())
                    .descend_and_strip(node)
                    .map(|value| (key.clone(), value))
            })
            .collect::<Result<Vec<_>>>()
            .map(AnyData::Object)
    }
}

#[async_trait]
impl MatcherExecutor for ObjectEachKeyMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ObjectEachKey;
        let fields = match require_object(kind, || expected_example(ctx, &self.matcher), ctx, actual) {
            Ok(fields) => fields,
            Err(errors) => return Ok(errors),
        };
        if fields.is_empty() {
            return Ok(make_results(MatchingError::new(
                kind,
                "Expected an object with at least one key property. It's not valid to use objectEachKeyMatches for empty objects",
                expected_example(ctx, &self.matcher),
                actual,
                ctx,
            )));
        }
        let keys: Vec<(String, AnyData)> = fields
            .iter()
            .map(|(key, _)| (key.clone(), AnyData::String(key.clone())))
            .collect();
        check_all(keys.iter().map(|(key, as_data)| {
            let key_ctx = ctx.add_location(key.as_str());
            async move { key_ctx.descend_and_check(&self.matcher, as_data).await }
        }))
        .await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        let key_ctx = ctx.add_marker("objectEachKeyMatches[matcher]");
        let key = match key_ctx.descend_and_strip(&self.matcher)? {
            AnyData::String(key) => key,
            other => {
                return Err(CaseError::Configuration(format!(
                    "The key matcher at {} must resolve to a string, but resolved to {} ({other})",
                    key_ctx.location(),
                    other.described_type()
                )))
            }
        };
        Ok(AnyData::Object(vec![(
            key,
            AnyData::from(EACH_KEY_PLACEHOLDER_VALUE),
        )]))
    }
}

#[async_trait]
impl MatcherExecutor for ObjectEachValueMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ObjectEachValue;
        let fields = match require_object(kind, || expected_example(ctx, &self.matcher), ctx, actual) {
            Ok(fields) => fields,
            Err(errors) => return Ok(errors),
        };
        if fields.is_empty() {
            return Ok(make_results(MatchingError::new(
                kind,
                "Expected an object with at least one key property. It's not valid to use objectEachValueMatches for empty objects",
                expected_example(ctx, &self.matcher),
                actual,
                ctx,
            )));
        }
        check_all(fields.iter().map(|(key, value)| {
            let value_ctx = ctx.add_location(key.as_str());
            async move { value_ctx.descend_and_check(&self.matcher, value).await }
        }))
        .await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        let value = ctx
            .add_marker("objectEachValueMatches[matcher]")
            .descend_and_strip(&self.matcher)?;
        Ok(AnyData::Object(vec![(
            EACH_VALUE_PLACEHOLDER_KEY.to_string(),
            value,
        )]))
    }
}
