// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the prompt-expansion service.
//!
//! The service takes a raw user prompt and returns an expanded JSON
//! specification (arbitrary schema, consumed as a generic document).
//! This is a plain request/response wrapper: no retries, no state.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use fabrica_core::FabricaError;

/// Request body for the expand-prompt endpoint.
#[derive(Debug, Serialize)]
struct ExpandRequest<'a> {
    prompt: &'a str,
}

/// HTTP client for the prompt-expansion service.
#[derive(Debug, Clone)]
pub struct PromptClient {
    client: reqwest::Client,
    base_url: String,
}

impl PromptClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FabricaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FabricaError::Service {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Expands a raw user prompt into a JSON specification document.
    ///
    /// Non-2xx responses become [`FabricaError::Service`], enriched with
    /// the `detail` or `error` field of the response body when the body
    /// is parseable JSON.
    pub async fn expand(&self, prompt: &str) -> Result<serde_json::Value, FabricaError> {
        let url = format!("{}/expand-prompt/", self.base_url);
        debug!(url = %url, "sending prompt for expansion");

        let response = self
            .client
            .post(&url)
            .json(&ExpandRequest { prompt })
            .send()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("prompt-expansion request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FabricaError::Service {
                message: format!(
                    "prompt-expansion service returned {status}: {}",
                    error_detail(&body)
                ),
                source: None,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("failed to parse prompt-expansion response: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

/// Pulls the `detail` or `error` field out of an error body, falling back
/// to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "error"] {
            if let Some(detail) = value.get(field).and_then(|v| v.as_str()) {
                return detail.to_string();
            }
        }
    }
    body.to_string()
}
