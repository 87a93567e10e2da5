use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::engine;
use crate::errors::{CaseError, Result};
use crate::matchers::{CaseNode, Matcher};
use crate::results::MatchResult;
use crate::value::AnyData;

/// Whether leaves compare values, or only their types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBy {
    #[default]
    Exact,
    Type,
}

impl FromStr for MatchBy {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchBy::Exact),
            "type" => Ok(MatchBy::Type),
            other => Err(CaseError::Configuration(format!(
                "Unknown matchBy '{other}' (expected 'exact' or 'type')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialisableTo {
    Json,
}

/// Parses `json` or `none`.
pub fn parse_serialisable_to(s: &str) -> Result<Option<SerialisableTo>> {
    match s {
        "json" => Ok(Some(SerialisableTo::Json)),
        "none" => Ok(None),
        other => Err(CaseError::Configuration(format!(
            "Unknown serialisableTo '{other}' (expected 'json' or 'none')"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    None,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    MaintainerDebug,
}

impl LogLevel {
    /// Whether an event logged at `event` is visible when running at `self`.
    pub fn should_log(self, event: LogLevel) -> bool {
        event != LogLevel::None && event <= self
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::None => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::MaintainerDebug => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "maintainerDebug" => Ok(LogLevel::MaintainerDebug),
            other => Err(CaseError::Configuration(format!("Unknown log level '{other}'"))),
        }
    }
}

/// Configuration supplied when a root context is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    pub match_by: MatchBy,
    pub serialisable_to: Option<SerialisableTo>,
    pub log_level: LogLevel,
    /// Inside `exactly-like`, reject keys the expectation doesn't declare.
    pub exact_objects_closed: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_by: MatchBy::Exact,
            serialisable_to: Some(SerialisableTo::Json),
            log_level: LogLevel::Warn,
            exact_objects_closed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    /// Descriptive marker such as `arrayContains[matcher]`.
    Marker(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{k}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Marker(m) => write!(f, ":{m}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Path from the traversal root, rendered JSONPath-style (`$.body.items[0]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(Vec<PathSegment>);

impl Location {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn extended(&self, segment: PathSegment) -> Location {
        let mut segments = self.0.clone();
        segments.push(segment);
        Location(segments)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Per-descent state. Never mutated: every descent derives a new one.
#[derive(Debug, Clone)]
pub struct MatchContext {
    match_by: MatchBy,
    serialisable_to: Option<SerialisableTo>,
    strict: bool,
    exact_objects_closed: bool,
    log_level: LogLevel,
    location: Location,
}

impl MatchContext {
    pub fn root(config: &MatchConfig) -> Self {
        Self {
            match_by: config.match_by,
            serialisable_to: config.serialisable_to,
            strict: false,
            exact_objects_closed: config.exact_objects_closed,
            log_level: config.log_level,
            location: Location::default(),
        }
    }

    pub fn match_by(&self) -> MatchBy {
        self.match_by
    }

    pub fn serialisable_to(&self) -> Option<SerialisableTo> {
        self.serialisable_to
    }

    pub fn is_exact(&self) -> bool {
        self.match_by == MatchBy::Exact
    }

    /// True inside an `exactly-like` subtree.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub(crate) fn should_log(&self, event: LogLevel) -> bool {
        self.log_level.should_log(event)
    }

    pub(crate) fn rejects_unexpected_keys(&self) -> bool {
        self.strict && self.exact_objects_closed
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn add_location(&self, segment: impl Into<PathSegment>) -> MatchContext {
        MatchContext {
            location: self.location.extended(segment.into()),
            ..self.clone()
        }
    }

    pub(crate) fn add_marker(&self, marker: impl Into<String>) -> MatchContext {
        self.add_location(PathSegment::Marker(marker.into()))
    }

    /// Derives the context a matcher's own executor runs in.
    pub fn fold(&self, matcher: &Matcher) -> MatchContext {
        match matcher {
            Matcher::ExactlyLike(_) => MatchContext {
                match_by: MatchBy::Exact,
                strict: true,
                ..self.clone()
            },
            Matcher::ShapedLike(_)
            | Matcher::AnyNumber(_)
            | Matcher::AnyInteger(_)
            | Matcher::AnyString(_)
            | Matcher::AnyBoolean(_)
            | Matcher::AnyNull(_)
                if !self.strict =>
            {
                MatchContext {
                    match_by: MatchBy::Type,
                    ..self.clone()
                }
            }
            _ => self.clone(),
        }
    }

    pub fn descend_and_check<'a>(
        &'a self,
        node: &'a CaseNode,
        actual: &'a AnyData,
    ) -> BoxFuture<'a, Result<MatchResult>> {
        engine::descend_and_check(node, self, actual)
    }

    pub fn descend_and_strip(&self, node: &CaseNode) -> Result<AnyData> {
        engine::descend_and_strip(node, self)
    }
}
