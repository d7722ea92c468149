//! One-attempt Wikipedia API client.
//!
//! Issues a single `action=query` request for the latest revision content
//! of a title and classifies the response into a [`FetchOutcome`]. Retrying
//! is the retry wrapper's job; this client never loops.

use crate::config::FetcherConfig;
use crate::models::FetchOutcome;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the Wikipedia query API.
pub struct PageClient {
    http: reqwest::Client,
    api_url: String,
}

impl PageClient {
    /// Create a client from fetcher settings.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("wikitally/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    /// Perform exactly one fetch attempt for a topic.
    ///
    /// All failure modes are folded into the returned [`FetchOutcome`];
    /// this never loops and never sleeps.
    pub async fn fetch_once(&self, topic: &str) -> FetchOutcome {
        debug!("Fetching page for topic: {}", topic);

        let response = match self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("titles", topic),
                ("prop", "revisions"),
                ("rvprop", "content"),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::TransportError(describe_transport_error(&e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }
        if !status.is_success() {
            return FetchOutcome::TransportError(format!("unexpected HTTP status {}", status));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::TransportError(format!("malformed response body: {}", e)),
        };

        classify_body(&body)
    }
}

/// Classify a parsed API response body.
///
/// A null body or a body lacking the expected `query`/`pages` structure is
/// treated as rate limiting, since the API signals exhaustion this way in
/// practice. The sentinel page id "-1" means the title resolved to no page.
pub fn classify_body(body: &Value) -> FetchOutcome {
    if body.is_null() {
        return FetchOutcome::RateLimited;
    }

    let Some(pages) = body
        .get("query")
        .and_then(|query| query.get("pages"))
        .and_then(Value::as_object)
    else {
        return FetchOutcome::RateLimited;
    };

    let Some((page_id, page)) = pages.iter().next() else {
        return FetchOutcome::RateLimited;
    };

    if page_id == "-1" {
        return FetchOutcome::NotFound;
    }

    match page
        .get("revisions")
        .and_then(|revisions| revisions.get(0))
        .and_then(|revision| revision.get("*"))
        .and_then(Value::as_str)
    {
        Some(content) if !content.is_empty() => FetchOutcome::Content(content.to_string()),
        _ => FetchOutcome::RateLimited,
    }
}

/// Describe a reqwest send failure for logging.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("request failed: {}", err)
    }
}
