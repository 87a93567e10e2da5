use async_trait::async_trait;
use itertools::Itertools;

use super::MatcherExecutor;
use crate::comparison::strictly_equal;
use crate::context::{MatchContext, SerialisableTo};
use crate::errors::{CaseError, Result};
use crate::matchers::{
    BooleanMatcher, HttpStatusMatcher, IntegerMatcher, LiteralMatcher, MatcherKind, NullMatcher,
    NumberMatcher, StringMatcher,
};
use crate::results::{combine_results, error_when, make_no_error_result, MatchResult, MatchingError};
use crate::value::AnyData;

fn exact_match(
    kind: MatcherKind,
    example: &AnyData,
    ctx: &MatchContext,
    actual: &AnyData,
) -> MatchResult {
    error_when(ctx.is_exact() && !strictly_equal(actual, example), || {
        MatchingError::new(
            kind,
            format!(
                "'{actual}' ({}) is not exactly equal to '{example}' ({})",
                actual.type_name(),
                example.type_name()
            ),
            example.clone(),
            actual,
            ctx,
        )
    })
}

fn check_number(
    kind: MatcherKind,
    example: &AnyData,
    ctx: &MatchContext,
    actual: &AnyData,
) -> MatchResult {
    let json = ctx.serialisable_to() == Some(SerialisableTo::Json);
    let error = |message: String| MatchingError::new(kind, message, example.clone(), actual, ctx);
    let type_errors = match actual.as_f64() {
        None => vec![error(format!("'{}' is not a number", actual.type_name()))],
        Some(n) => combine_results([
            error_when(json && n.is_nan(), || {
                error("NaN is not a valid JSON number".to_string())
            }),
            error_when(json && n.is_infinite(), || {
                error(format!("JSON numbers must be finite, but got '{actual}'"))
            }),
        ]),
    };
    combine_results([exact_match(kind, example, ctx, actual), type_errors])
}

fn check_string(
    kind: MatcherKind,
    example: &AnyData,
    ctx: &MatchContext,
    actual: &AnyData,
) -> MatchResult {
    combine_results([
        exact_match(kind, example, ctx, actual),
        error_when(!matches!(actual, AnyData::String(_)), || {
            MatchingError::new(
                kind,
                format!("'{}' is not a string", actual.type_name()),
                example.clone(),
                actual,
                ctx,
            )
        }),
    ])
}

fn check_boolean(
    kind: MatcherKind,
    example: &AnyData,
    ctx: &MatchContext,
    actual: &AnyData,
) -> MatchResult {
    combine_results([
        exact_match(kind, example, ctx, actual),
        error_when(!matches!(actual, AnyData::Bool(_)), || {
            MatchingError::new(
                kind,
                format!("'{}' is not a boolean", actual.type_name()),
                example.clone(),
                actual,
                ctx,
            )
        }),
    ])
}

fn check_null(kind: MatcherKind, ctx: &MatchContext, actual: &AnyData) -> MatchResult {
    error_when(*actual != AnyData::Null, || {
        MatchingError::new(kind, format!("'{actual}' is not null"), AnyData::Null, actual, ctx)
    })
}

#[async_trait]
impl MatcherExecutor for LiteralMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::Literal;
        Ok(match &self.example {
            AnyData::Null => check_null(kind, ctx, actual),
            AnyData::Bool(_) => check_boolean(kind, &self.example, ctx, actual),
            AnyData::Number(_) => check_number(kind, &self.example, ctx, actual),
            AnyData::String(_) => check_string(kind, &self.example, ctx, actual),
            // Container literals only come from hand-written contract files.
            // They carry no nested matchers, so they always compare exactly.
            AnyData::Array(_) | AnyData::Object(_) => {
                error_when(!strictly_equal(actual, &self.example), || {
                    MatchingError::new(
                        kind,
                        format!("'{actual}' is not exactly equal to '{}'", self.example),
                        self.example.clone(),
                        actual,
                        ctx,
                    )
                })
            }
        })
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(self.example.clone())
    }
}

#[async_trait]
impl MatcherExecutor for NumberMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        Ok(check_number(MatcherKind::AnyNumber, &AnyData::Number(self.example), ctx, actual))
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(AnyData::Number(self.example))
    }
}

#[async_trait]
impl MatcherExecutor for IntegerMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let kind = MatcherKind::AnyInteger;
        let example = AnyData::from(self.example);
        let not_whole = actual
            .as_f64()
            .is_some_and(|n| !(n.is_finite() && n.fract() == 0.0));
        Ok(combine_results([
            check_number(kind, &example, ctx, actual),
            error_when(not_whole, || {
                MatchingError::new(
                    kind,
                    format!("Expected an integer, but got '{actual}'"),
                    example.clone(),
                    actual,
                    ctx,
                )
            }),
        ]))
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(AnyData::from(self.example))
    }
}

#[async_trait]
impl MatcherExecutor for StringMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        Ok(check_string(
            MatcherKind::AnyString,
            &AnyData::String(self.example.clone()),
            ctx,
            actual,
        ))
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(AnyData::String(self.example.clone()))
    }
}

#[async_trait]
impl MatcherExecutor for BooleanMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        Ok(check_boolean(
            MatcherKind::AnyBoolean,
            &AnyData::Bool(self.example),
            ctx,
            actual,
        ))
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(AnyData::Bool(self.example))
    }
}

#[async_trait]
impl MatcherExecutor for NullMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        Ok(check_null(MatcherKind::AnyNull, ctx, actual))
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        Ok(AnyData::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusRule {
    Class(u16),
    Code(u16),
}

impl StatusRule {
    fn parse(code: &str) -> Result<Self> {
        let invalid = || {
            CaseError::Configuration(format!(
                "'{code}' is not a valid HTTP status (expected a code like '404' or a class like '4XX')"
            ))
        };
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
            return Err(invalid());
        }
        let class = u16::from(bytes[0] - b'0');
        if code[1..].eq_ignore_ascii_case("XX") {
            Ok(StatusRule::Class(class))
        } else {
            code.parse::<u16>().map(StatusRule::Code).map_err(|_| invalid())
        }
    }

    fn accepts(self, status: u16) -> bool {
        match self {
            StatusRule::Class(class) => status / 100 == class,
            StatusRule::Code(code) => status == code,
        }
    }

    fn example(self) -> u16 {
        match self {
            StatusRule::Class(class) => class * 100,
            StatusRule::Code(code) => code,
        }
    }
}

impl HttpStatusMatcher {
    fn rules(&self) -> Result<Vec<StatusRule>> {
        if self.codes.is_empty() {
            return Err(CaseError::Configuration(
                "An httpStatus matcher needs at least one code or class".into(),
            ));
        }
        self.codes.iter().map(|code| StatusRule::parse(code)).collect()
    }

    fn description(&self) -> String {
        self.codes.iter().join(" or ")
    }
}

#[async_trait]
impl MatcherExecutor for HttpStatusMatcher {
    async fn check(&self, ctx: &MatchContext, actual: &AnyData) -> Result<MatchResult> {
        let rules = self.rules()?;
        let expected = AnyData::String(self.description());
        let status = actual
            .as_f64()
            .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(n))
            .map(|n| n as u16);
        Ok(match status {
            None => vec![MatchingError::new(
                MatcherKind::HttpStatus,
                format!("'{actual}' is not a valid HTTP status code"),
                expected,
                actual,
                ctx,
            )],
            Some(status) if rules.iter().any(|rule| rule.accepts(status)) => make_no_error_result(),
            Some(status) => vec![MatchingError::new(
                MatcherKind::HttpStatus,
                format!("'{status}' is not a {} status code", self.description()),
                expected,
                actual,
                ctx,
            )],
        })
    }

    fn strip(&self, _ctx: &MatchContext) -> Result<AnyData> {
        let first = self.rules()?[0];
        Ok(AnyData::Number(f64::from(first.example())))
    }
}
