// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the text-to-image service.
//!
//! The service takes a prompt and returns raw image bytes. This is a
//! plain request/response wrapper: no retries, no state.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use fabrica_core::FabricaError;

/// Content type assumed when the service omits the header.
const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// Request body for the generate-image endpoint.
#[derive(Debug, Serialize)]
struct GenerateImageRequest<'a> {
    prompt: &'a str,
}

/// A generated image: raw bytes plus the declared content type.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// HTTP client for the text-to-image service.
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImageClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// Image generation is slow on CPU backends, so callers should pass a
    /// generous timeout.
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

    /// Generates an image for `prompt` and returns the raw bytes.
    pub async fn generate(&self, prompt: &str) -> Result<ImageArtifact, FabricaError> {
        let url = format!("{}/generate-image/", self.base_url);
        debug!(url = %url, "requesting image generation");

        let response = self
            .client
            .post(&url)
            .json(&GenerateImageRequest { prompt })
            .send()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("image-generation request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FabricaError::Service {
                message: format!(
                    "text-to-image service returned {status}: {}",
                    error_detail(&body)
                ),
                source: None,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("failed to read image bytes: {e}"),
                source: Some(Box::new(e)),
            })?
            .to_vec();

        debug!(bytes = bytes.len(), content_type = %content_type, "image received");

        Ok(ImageArtifact {
            bytes,
            content_type,
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
