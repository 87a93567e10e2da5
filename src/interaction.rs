//! HTTP request/response expectations.
//!
//! Every field is a [`CaseNode`], so any part of a request or response can be
//! a matcher rather than a literal.

use serde::{Deserialize, Serialize};

use crate::context::MatchContext;
use crate::errors::{CaseError, Result};
use crate::matchers::CaseNode;
use crate::value::AnyData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequestDescription {
    pub method: CaseNode,
    pub path: CaseNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CaseNode>,
}

impl HttpRequestDescription {
    pub fn new(method: impl Into<CaseNode>, path: impl Into<CaseNode>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<CaseNode>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponseDescription {
    pub status: CaseNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CaseNode>,
}

impl HttpResponseDescription {
    pub fn new(status: impl Into<CaseNode>) -> Self {
        Self {
            status: status.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<CaseNode>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A consumer sends `request` and expects something like `response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpInteraction {
    pub request: HttpRequestDescription,
    pub response: HttpResponseDescription,
}

impl HttpInteraction {
    /// Human-readable name, built from the stripped request and response.
    pub fn describe(&self, ctx: &MatchContext) -> String {
        let show = |node: &CaseNode| {
            ctx.descend_and_strip(node)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| "<matcher>".to_string())
        };
        format!(
            "an http '{}' request to '{}' returning a '{}' response",
            show(&self.request.method),
            show(&self.request.path),
            show(&self.response.status)
        )
    }
}

pub fn will_send_http_interaction(
    request: HttpRequestDescription,
    response: HttpResponseDescription,
) -> HttpInteraction {
    HttpInteraction { request, response }
}

/// Strips `node`, requiring the result to be a string.
pub fn must_resolve_to_string(node: &CaseNode, ctx: &MatchContext) -> Result<String> {
    match ctx.descend_and_strip(node)? {
        AnyData::String(s) => Ok(s),
        other => Err(CaseError::Configuration(format!(
            "The matcher at {} must resolve to a string, but resolved to {} ({other})",
            ctx.location(),
            other.described_type()
        ))),
    }
}
