// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible APIs.
//!
//! Handles bearer authentication, JSON request/response bodies and a single
//! retry on transient errors (429 and 5xx).

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// Failure of a single HTTP exchange. Adapters turn this into a
/// provider or embedding error.
#[derive(Debug)]
pub struct HttpFailure {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HttpFailure {
    fn new(message: String) -> Self {
        Self {
            message,
            source: None,
        }
    }

    fn with_source(message: String, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message,
            source: Some(Box::new(source)),
        }
    }
}

/// Client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// `api_key` becomes a bearer token when present.
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self, HttpFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HttpFailure::with_source("invalid API key header value".into(), e))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpFailure::with_source(format!("failed to build HTTP client: {e}"), e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Override the pause before the retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `{base_url}{path}` and decode the JSON answer.
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, HttpFailure>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| HttpFailure::with_source(format!("HTTP request failed: {e}"), e))?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "response received");

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| HttpFailure::with_source(format!("failed to read response body: {e}"), e))?;
                return serde_json::from_str(&text)
                    .map_err(|e| HttpFailure::with_source(format!("failed to parse API response: {e}"), e));
            }

            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => match api_err.error.type_ {
                    Some(kind) => format!("API error {status} ({kind}): {}", api_err.error.message),
                    None => format!("API error {status}: {}", api_err.error.message),
                },
                Err(_) => format!("API returned {status}: {text}"),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(HttpFailure::new(message));
                continue;
            }
            return Err(HttpFailure::new(message));
        }

        Err(last_error.unwrap_or_else(|| HttpFailure::new("request failed after retries".into())))
    }
}

/// 429 and every 5xx are worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
