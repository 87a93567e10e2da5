pub mod errors;
pub mod context;
pub mod value;
pub mod results;
pub mod matchers;
pub mod engine;
pub mod executors;
pub mod interaction;
pub mod transport;
pub mod contract;
pub mod states;
pub mod verifier;
pub mod printer;
mod comparison;

pub use context::{LogLevel, MatchBy, MatchConfig, MatchContext, SerialisableTo};
pub use errors::{CaseError, Result};
pub use matchers::{infer_matcher, CaseNode, Matcher, MatcherKind};
pub use results::{MatchResult, MatchingError};
pub use value::AnyData;

/// Entry point for matching with a fixed configuration. Every call builds a
/// fresh root context, so one engine can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: MatchConfig,
}

impl Engine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    fn root(&self) -> MatchContext {
        MatchContext::root(&self.config)
    }

    fn debug_enabled(&self) -> bool {
        self.config.log_level.should_log(LogLevel::Debug)
    }

    /// Checks `actual` against `expected`, collecting every mismatch.
    pub async fn check_match(&self, expected: &CaseNode, actual: &AnyData) -> Result<MatchResult> {
        let root = self.root();
        if self.debug_enabled() {
            tracing::debug!(match_by = ?root.match_by(), "check_match");
        }
        engine::descend_and_check(expected, &root, actual).await
    }

    /// Generates the concrete example `expected` describes.
    pub fn strip_matchers(&self, expected: &CaseNode) -> Result<AnyData> {
        if self.debug_enabled() {
            tracing::debug!("strip_matchers");
        }
        engine::descend_and_strip(expected, &self.root())
    }

    /// Checks that `expected` accepts its own generated example.
    pub async fn self_verify(&self, expected: &CaseNode) -> Result<MatchResult> {
        let root = self.root();
        if self.debug_enabled() {
            tracing::debug!("self_verify");
        }
        engine::self_verify(expected, &root).await
    }
}

/// Convenience: check with the default configuration.
pub async fn check_match(expected: &CaseNode, actual: &AnyData) -> Result<MatchResult> {
    Engine::default().check_match(expected, actual).await
}

/// Convenience: strip with the default configuration.
pub fn strip_matchers(expected: &CaseNode) -> Result<AnyData> {
    Engine::default().strip_matchers(expected)
}

/// Convenience: self-verify with the default configuration.
pub async fn self_verify(expected: &CaseNode) -> Result<MatchResult> {
    Engine::default().self_verify(expected).await
}
