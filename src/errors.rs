use std::io;
use thiserror::Error;

use crate::matchers::MatcherKind;

/// Faults that abort a traversal. Expectation mismatches are never reported
/// through this type; they are collected as [`crate::MatchingError`]s.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Something inside the engine went wrong. Seeing one of these means a bug.
    #[error("core error: {0}")]
    Core(String),

    /// The contract or run configuration is wrong and the author can fix it.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The matcher has no single representative example.
    #[error("unable to strip matcher '{kind}': {reason}")]
    StripUnsupported { kind: MatcherKind, reason: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl CaseError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CaseError::Configuration(_) | CaseError::StripUnsupported { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CaseError>;
