//! One executor per matcher kind. Each knows how to check an actual value
//! and how to strip itself down to an example.

use std::future::Future;

use async_trait::async_trait;
use futures::future::join_all;

use crate::context::MatchContext;
use crate::errors::Result;
use crate::matchers::{CaseNode, Matcher};
use crate::results::{combine_results, MatchResult};
use crate::value::AnyData;

mod arrays;
mod leaf;
mod objects;

/// Check and strip for one matcher kind.
///
/// `ctx` has already been folded for the matcher, so executors read
/// `match_by` from it directly. Executors never recurse themselves; children
/// go back through [`MatchContext::descend_and_check`].
#[async_trait]
pub trait MatcherExecutor: Send + Sync {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult>;
    fn strip(&self, ctx: &MatchContext) -> Result<AnyData>;
}

/// Resolves the executor for a matcher. Exhaustive over the closed set of
/// kinds, so there is no "missing executor" case at runtime.
pub fn executor_for(matcher: &Matcher) -> &dyn MatcherExecutor {
    match matcher {
        Matcher::Literal(m) => m,
        Matcher::AnyNumber(m) => m,
        Matcher::AnyInteger(m) => m,
        Matcher::AnyString(m) => m,
        Matcher::AnyBoolean(m) => m,
        Matcher::AnyNull(m) => m,
        Matcher::HttpStatus(m) => m,
        Matcher::ShapedLike(m) | Matcher::ExactlyLike(m) => m,
        Matcher::ShapedArray(m) => m,
        Matcher::ShapedObject(m) => m,
        Matcher::ObjectEachKey(m) => m,
        Matcher::ObjectEachValue(m) => m,
        Matcher::ArrayEachEntry(m) => m,
        Matcher::ArrayContains(m) => m,
        Matcher::ArrayStartsWith(m) => m,
        Matcher::ArrayLength(m) => m,
    }
}

/// Runs sibling checks concurrently; results come back in input order.
pub(crate) async fn check_each<F>(checks: impl IntoIterator<Item = F>) -> Result<Vec<MatchResult>>
where
    F: Future<Output = Result<MatchResult>>,
{
    join_all(checks).await.into_iter().collect()
}

pub(crate) async fn check_all<F>(checks: impl IntoIterator<Item = F>) -> Result<MatchResult>
where
    F: Future<Output = Result<MatchResult>>,
{
    Ok(combine_results(check_each(checks).await?))
}

/// Best-effort example for error reports.
pub(crate) fn expected_example(ctx: &MatchContext, node: &CaseNode) -> AnyData {
    ctx.descend_and_strip(node)
        .unwrap_or_else(|e| AnyData::String(format!("<no single example: {e}>")))
}
