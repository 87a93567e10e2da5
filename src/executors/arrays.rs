use async_trait::async_trait;
use itertools::Itertools;

use super::{check_all, check_each, expected_example, MatcherExecutor};
use crate::context::MatchContext;
use crate::errors::{CaseError, Result};
use crate::matchers::{
    ArrayContainsMatcher, ArrayEachEntryMatcher, ArrayLengthMatcher, ArrayStartsWithMatcher,
    CaseNode, MatcherKind, ShapedArrayMatcher,
};
use crate::results::{
    error_when, has_errors, make_no_error_result, make_results, MatchResult, MatchingError,
};
use crate::value::AnyData;

/// Returns the array's entries, or the error explaining why it isn't one.
fn require_array<'a>(
    kind: MatcherKind,
    expected: impl FnOnce() -> AnyData,
    ctx: &MatchContext,
    actual: &'a AnyData,
) -> std::result::Result<&'a [AnyData], MatchResult> {
    actual.as_array().ok_or_else(|| {
        make_results(MatchingError::new(
            kind,
            format!("'{actual}' is not an array"),
            expected(),
            actual,
            ctx,
        ))
    })
}

/// Checks `entries[i]` against `nodes[i]` for every declared node.
async fn check_positionally(
    ctx: &MatchContext,
    nodes: &[CaseNode],
    entries: &[AnyData],
) -> Result<MatchResult> {
    check_all(nodes.iter().zip(entries).enumerate().map(|(i, (node, entry))| {
        let entry_ctx = ctx.add_location(i);
        async move { entry_ctx.descend_and_check(node, entry).await }
    }))
    .await
}

/// Matchers that list their entry matchers need at least one of them.
fn require_matchers(kind: MatcherKind, matchers: &[CaseNode]) -> Result<()> {
    if matchers.is_empty() {
        return Err(CaseError::Configuration(format!(
            "{kind} needs at least one matcher, but none were given"
        )));
    }
    Ok(())
}

fn strip_positionally(ctx: &MatchContext, nodes: &[CaseNode]) -> Result<AnyData> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| ctx.add_location(i).descend_and_strip(node))
        .collect::<Result<Vec<_>>>()
        .map(AnyData::Array)
}

#[async_trait]
impl MatcherExecutor for ShapedArrayMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ShapedArray;
        let expected = || self.strip(ctx).unwrap_or(AnyData::Array(Vec::new()));
        let entries = match require_array(kind, expected, ctx, actual) {
            Ok(entries) => entries,
            Err(errors) => return Ok(errors),
        };
        let wrong_length = entries.len() < self.entries.len()
            || (ctx.is_exact() && entries.len() != self.entries.len());
        if wrong_length {
            let (expected_len, actual_len) = (self.entries.len(), entries.len());
            let message = if ctx.is_exact() {
                format!(
                    "Array has different lengths, so it is not exactly equal (expected {expected_len} entries, but got {actual_len})"
                )
            } else {
                format!("Array has different lengths (expected {expected_len} entries, but got {actual_len})")
            };
            return Ok(make_results(MatchingError::new(
                kind,
                message,
                expected(),
                actual,
                ctx,
            )));
        }
        check_positionally(ctx, &self.entries, entries).await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        strip_positionally(ctx, &self.entries)
    }
}

#[async_trait]
impl MatcherExecutor for ArrayEachEntryMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ArrayEachEntry;
        let expected = || AnyData::Array(vec![expected_example(ctx, &self.matcher)]);
        let entries = match require_array(kind, expected, ctx, actual) {
            Ok(entries) => entries,
            Err(errors) => return Ok(errors),
        };
        if entries.is_empty() {
            return Ok(make_results(MatchingError::new(
                kind,
                "Expected a non-empty array. It's not valid to use arrayEachEntryMatches for empty arrays",
                expected(),
                actual,
                ctx,
            )));
        }
        check_all(entries.iter().enumerate().map(|(i, entry)| {
            let entry_ctx = ctx.add_location(i);
            async move { entry_ctx.descend_and_check(&self.matcher, entry).await }
        }))
        .await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        let entry = ctx
            .add_marker("arrayEachEntryMatches[matcher]")
            .descend_and_strip(&self.matcher)?;
        Ok(AnyData::Array(vec![entry]))
    }
}

impl ArrayContainsMatcher {
    /// One error when no entry satisfies `node`, carrying every entry's
    /// reasons in entry order.
    async fn check_one(
        &self,
        ctx: &MatchContext,
        index: usize,
        node: &CaseNode,
        entries: &[AnyData],
        actual: &AnyData,
    ) -> Result<MatchResult> {
        let matcher_ctx = ctx.add_marker(format!("arrayContains[{index}]"));
        let per_entry = check_each(entries.iter().enumerate().map(|(i, entry)| {
            let entry_ctx = matcher_ctx.add_location(i);
            async move { entry_ctx.descend_and_check(node, entry).await }
        }))
        .await?;
        if per_entry.iter().any(|result| !has_errors(result)) {
            return Ok(make_no_error_result());
        }
        let reasons = per_entry
            .iter()
            .enumerate()
            .flat_map(|(i, errors)| errors.iter().map(move |e| format!("  [{i}] {}", e.message())))
            .join("\n");
        Ok(make_results(MatchingError::new(
            MatcherKind::ArrayContains,
            format!("None of the {} entries matched the expectation:\n{reasons}", entries.len()),
            expected_example(&matcher_ctx, node),
            actual,
            &matcher_ctx,
        )))
    }
}

#[async_trait]
impl MatcherExecutor for ArrayContainsMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ArrayContains;
        require_matchers(kind, &self.matchers)?;
        let expected = || self.strip(ctx).unwrap_or(AnyData::Array(Vec::new()));
        let entries = match require_array(kind, expected, ctx, actual) {
            Ok(entries) => entries,
            Err(errors) => return Ok(errors),
        };
        if entries.is_empty() {
            return Ok(make_results(MatchingError::new(
                kind,
                "Expected an array containing at least one matching entry, but the array was empty",
                expected(),
                actual,
                ctx,
            )));
        }
        check_all(
            self.matchers
                .iter()
                .enumerate()
                .map(|(index, node)| self.check_one(ctx, index, node, entries, actual)),
        )
        .await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        require_matchers(MatcherKind::ArrayContains, &self.matchers)?;
        self.matchers
            .iter()
            .enumerate()
            .map(|(i, node)| {
                ctx.add_marker(format!("arrayContains[{i}]"))
                    .descend_and_strip(node)
            })
            .collect::<Result<Vec<_>>>()
            .map(AnyData::Array)
    }
}

#[async_trait]
impl MatcherExecutor for ArrayStartsWithMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::ArrayStartsWith;
        require_matchers(kind, &self.matchers)?;
        let expected = || self.strip(ctx).unwrap_or(AnyData::Array(Vec::new()));
        let entries = match require_array(kind, expected, ctx, actual) {
            Ok(entries) => entries,
            Err(errors) => return Ok(errors),
        };
        if entries.len() < self.matchers.len() {
            return Ok(make_results(MatchingError::new(
                kind,
                format!(
                    "Array has different lengths (expected at least {} entries, but got {})",
                    self.matchers.len(),
                    entries.len()
                ),
                expected(),
                actual,
                ctx,
            )));
        }
        check_positionally(ctx, &self.matchers, entries).await
    }

    fn strip(&self, ctx: &MatchContext) -> Result<AnyData> {
        require_matchers(MatcherKind::ArrayStartsWith, &self.matchers)?;
        strip_positionally(ctx, &self.matchers)
    }
}

impl ArrayLengthMatcher {
    fn validate(&self) -> Result<()> {
        match self.max_length {
            Some(max) if max < self.min() => Err(CaseError::Configuration(format!(
                "arrayLength has a maximum length ({max}) below its minimum length ({})",
                self.min()
            ))),
            _ => Ok(()),
        }
    }

    fn describe(&self) -> AnyData {
        let range = match self.max_length {
            Some(max) => format!("between {} and {max} entries", self.min()),
            None => format!("at least {} entries", self.min()),
        };
        AnyData::String(format!("an array with {range}"))
    }
}

#[async_trait]
impl MatcherExecutor for ArrayLengthMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        self.validate()?;
        let kind = MatcherKind::ArrayLength;
        let entries = match require_array(kind, || self.describe(), ctx, actual) {
            Ok(entries) => entries,
            Err(errors) => return Ok(errors),
        };
        let len = entries.len();
        let min = self.min();
        let under = error_when(len < min, || {
            MatchingError::new(
                kind,
                format!("Array length of {len} is under the minimum length of {min}"),
                self.describe(),
                actual,
                ctx,
            )
        });
        let over = match self.max_length {
            Some(max) => error_when(len > max, || {
                MatchingError::new(
                    kind,
                    format!("Array length of {len} is over the maximum length of {max}"),
                    self.describe(),
                    actual,
                    ctx,
                )
            }),
            None => make_no_error_result(),
        };
        Ok(under.into_iter().chain(over).collect())
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        self.validate()?;
        if self.has_bounds() {
            return Err(CaseError::StripUnsupported {
                kind: MatcherKind::ArrayLength,
                reason: format!(
                    "there is no single example for {}; wrap it with an explicit example",
                    self.describe()
                ),
            });
        }
        Ok(AnyData::Array(vec![AnyData::Null]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MatchConfig;

    fn root() -> MatchContext {
        MatchContext::root(&MatchConfig::default())
    }

    #[test]
    fn bounded_length_refuses_to_strip() {
        let bounded = ArrayLengthMatcher {
            min_length: Some(2),
            max_length: None,
        };
        assert!(matches!(
            bounded.strip(&root()),
            Err(CaseError::StripUnsupported { kind: MatcherKind::ArrayLength, .. })
        ));
        let unbounded = ArrayLengthMatcher::default();
        assert_eq!(unbounded.strip(&root()).unwrap(), AnyData::Array(vec![AnyData::Null]));
    }

    #[test]
    fn inverted_bounds_are_a_configuration_fault() {
        let inverted = ArrayLengthMatcher {
            min_length: Some(3),
            max_length: Some(1),
        };
        let outcome = futures::executor::block_on(inverted.check(&root(), &AnyData::Array(vec![])));
        assert!(matches!(outcome, Err(CaseError::Configuration(_))));
    }

    #[test]
    fn empty_matcher_lists_are_configuration_faults() {
        let contains = ArrayContainsMatcher {
            matchers: vec![],
            example: None,
        };
        assert!(matches!(contains.strip(&root()), Err(CaseError::Configuration(_))));
        let actual = AnyData::Array(vec![AnyData::Null]);
        let checked = futures::executor::block_on(contains.check(&root(), &actual));
        assert!(matches!(checked, Err(CaseError::Configuration(_))));

        let starts_with = ArrayStartsWithMatcher { matchers: vec![] };
        assert!(matches!(starts_with.strip(&root()), Err(CaseError::Configuration(_))));
        let checked = futures::executor::block_on(starts_with.check(&root(), &actual));
        assert!(matches!(checked, Err(CaseError::Configuration(_))));
    }

    #[test]
    fn length_description_names_the_range() {
        let bounds = ArrayLengthMatcher {
            min_length: Some(2),
            max_length: Some(4),
        };
        assert_eq!(bounds.describe(), AnyData::from("an array with between 2 and 4 entries"));
    }
}
