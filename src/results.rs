use std::fmt;

use crate::context::{Location, MatchContext};
use crate::matchers::MatcherKind;
use crate::value::AnyData;

/// One way in which an actual value failed an expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingError {
    message: String,
    expected: AnyData,
    actual: AnyData,
    location: Location,
    kind: MatcherKind,
}

impl MatchingError {
    pub fn new(
        kind: MatcherKind,
        message: impl Into<String>,
        expected: AnyData,
        actual: &AnyData,
        ctx: &MatchContext,
    ) -> Self {
        Self {
            message: message.into(),
            expected,
            actual: actual.clone(),
            location: ctx.location().clone(),
            kind,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The matcher's example, or a description when there is no single one.
    pub fn expected(&self) -> &AnyData {
        &self.expected
    }

    pub fn actual(&self) -> &AnyData {
        &self.actual
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> MatcherKind {
        self.kind
    }
}

impl fmt::Display for MatchingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (at {})", self.kind, self.message, self.location)
    }
}

/// Empty means the actual value matched.
pub type MatchResult = Vec<MatchingError>;

pub fn make_no_error_result() -> MatchResult {
    Vec::new()
}

pub fn make_results(error: MatchingError) -> MatchResult {
    vec![error]
}

pub fn error_when(test: bool, error: impl FnOnce() -> MatchingError) -> MatchResult {
    if test {
        vec![error()]
    } else {
        Vec::new()
    }
}

/// Concatenates results, keeping their order.
pub fn combine_results(results: impl IntoIterator<Item = MatchResult>) -> MatchResult {
    results.into_iter().flatten().collect()
}

pub fn has_errors(result: &MatchResult) -> bool {
    !result.is_empty()
}
