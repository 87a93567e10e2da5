//! Replays an [`HttpInteraction`] against a real provider.

use std::time::Duration;

use futures::future;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::context::MatchContext;
use crate::errors::{CaseError, Result};
use crate::interaction::{must_resolve_to_string, HttpInteraction};
use crate::results::{combine_results, make_no_error_result, MatchResult};
use crate::value::AnyData;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends stripped requests and checks the responses that come back.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Option<String>,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| CaseError::Core(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn require_base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                CaseError::Configuration(
                    "Must provide a URL in order to validate HTTP request consumers".into(),
                )
            })
    }

    /// Sends the interaction's request and checks the response. Status and
    /// body errors come back in that order.
    pub async fn verify(&self, interaction: &HttpInteraction, ctx: &MatchContext) -> Result<MatchResult> {
        let base_url = self.require_base_url()?;
        let request = &interaction.request;
        let method = must_resolve_to_string(&request.method, &ctx.add_location("method"))?;
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            CaseError::Configuration(format!("'{method}' is not a valid HTTP method"))
        })?;
        let path = must_resolve_to_string(&request.path, &ctx.add_location("path"))?;
        let url = format!("{}{path}", base_url.trim_end_matches('/'));

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = &request.body {
            let body = ctx.add_location("body").descend_and_strip(body)?;
            builder = builder.json(&Value::from(body));
        }
        tracing::debug!(%method, %url, "sending request");

        let response = builder.send().await.map_err(|e| send_failure(&url, e))?;
        let status = AnyData::from(i64::from(response.status().as_u16()));
        let bytes = response.bytes().await.map_err(|e| {
            CaseError::Core(format!("Something went wrong while reading the http response: {e}"))
        })?;
        let body = parse_body(&bytes);
        tracing::debug!(%status, "received response");

        let expected = &interaction.response;
        let response_ctx = ctx.add_location("response");
        let status_ctx = response_ctx.add_location("status");
        let body_ctx = response_ctx.add_location("body");
        let (status_result, body_result) = future::join(
            status_ctx.descend_and_check(&expected.status, &status),
            async {
                match &expected.body {
                    Some(node) => body_ctx.descend_and_check(node, &body).await,
                    None => Ok(make_no_error_result()),
                }
            },
        )
        .await;
        Ok(combine_results([status_result?, body_result?]))
    }
}

fn send_failure(url: &str, e: reqwest::Error) -> CaseError {
    if e.is_connect() || e.is_timeout() || e.is_request() || e.is_builder() {
        CaseError::Configuration(format!(
            "Request to {url} was made, but there was no response.\n\n\
             Confirm that you have:\n 1) Started the real server\n 2) Provided the correct URL to the running server\n\n\
             Underlying error: {e}"
        ))
    } else {
        CaseError::Core(format!("Something went wrong while creating the http request: {e}"))
    }
}

/// Empty is null, JSON is parsed, anything else is checked as a string.
fn parse_body(bytes: &[u8]) -> AnyData {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return AnyData::Null;
    }
    serde_json::from_slice::<Value>(bytes)
        .map(AnyData::from)
        .unwrap_or_else(|_| AnyData::String(String::from_utf8_lossy(bytes).into_owned()))
}
