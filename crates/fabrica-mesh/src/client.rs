// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the 3D-generation provider, with submit-and-poll
//! orchestration.
//!
//! [`MeshClient::generate`] turns a single long-running remote job into a
//! result: submit once, poll until a terminal status or the wall-clock
//! budget runs out, resolve the artifact URL from the result payload, and
//! download the bytes. There are no retries beyond the polling loop
//! itself; a submission or download failure is terminal for that call.

use std::time::Duration;

use tracing::{debug, warn};

use fabrica_core::FabricaError;

use crate::types::{Prediction, build_submit_payload, resolve_output};
use crate::{HUNYUAN_MODEL_ID, JobStatus};

/// Settings for [`MeshClient`].
#[derive(Debug, Clone)]
pub struct MeshSettings {
    /// Predictions endpoint, e.g. `https://api.synexa.ai/v1/predictions`.
    pub base_url: String,
    /// Provider API key. `None` fails every call before any network I/O.
    pub api_key: Option<String>,
    /// Provider model identifier.
    pub model_id: String,
    /// Sleep between status polls.
    pub poll_interval: Duration,
    /// Overall wall-clock budget for the polling loop.
    pub poll_timeout: Duration,
    /// Timeout for individual submit/poll HTTP calls.
    pub request_timeout: Duration,
    /// Timeout for the artifact download.
    pub download_timeout: Duration,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.synexa.ai/v1/predictions".to_string(),
            api_key: None,
            model_id: HUNYUAN_MODEL_ID.to_string(),
            poll_interval: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(300),
        }
    }
}

/// A downloaded 3D model artifact.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub bytes: Vec<u8>,
    /// Content type inferred extension-first, then from the download
    /// response, then `application/octet-stream`.
    pub content_type: String,
    /// File extension (with leading dot) for building object keys.
    pub extension: String,
}

/// HTTP client for the 3D-generation provider.
#[derive(Debug, Clone)]
pub struct MeshClient {
    http: reqwest::Client,
    download: reqwest::Client,
    settings: MeshSettings,
}

impl MeshClient {
    /// Creates a client from settings.
    ///
    /// Two underlying HTTP clients are built: a short-timeout one for
    /// submit/poll calls and a long-timeout redirect-following one for the
    /// artifact download (providers hand out redirecting CDN URLs).
    pub fn new(settings: MeshSettings) -> Result<Self, FabricaError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| FabricaError::Service {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let download = reqwest::Client::builder()
            .timeout(settings.download_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FabricaError::Service {
                message: format!("failed to build download client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            download,
            settings,
        })
    }

    /// True when an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    /// Runs one generation job to completion and returns the model bytes.
    ///
    /// The job is submitted once; if the first response is already
    /// terminal-success the polling loop is skipped entirely. On timeout
    /// the remote job is simply abandoned — no cancellation signal is
    /// sent, the provider may keep running it orphaned.
    pub async fn generate(
        &self,
        prompt: &str,
        image_ref: Option<&str>,
    ) -> Result<ModelArtifact, FabricaError> {
        let mut prediction = self.submit(prompt, image_ref).await?;
        let mut waited = Duration::ZERO;

        loop {
            match &prediction.status {
                JobStatus::Succeeded => break,
                JobStatus::Failed | JobStatus::Canceled => {
                    return Err(FabricaError::JobFailed {
                        status: prediction.status.to_string(),
                        detail: prediction
                            .error
                            .clone()
                            .unwrap_or_else(|| "no detail reported by provider".to_string()),
                    });
                }
                JobStatus::Unknown(raw) => {
                    warn!(status = %raw, "provider reported unrecognized job status");
                    return Err(FabricaError::UnknownJobStatus(raw.clone()));
                }
                JobStatus::Starting | JobStatus::Processing => {
                    let id = prediction.id.clone().ok_or_else(|| FabricaError::Service {
                        message: "provider returned no prediction id".to_string(),
                        source: None,
                    })?;

                    if waited >= self.settings.poll_timeout {
                        return Err(FabricaError::JobTimeout {
                            waited_secs: waited.as_secs(),
                            last_status: prediction.status.to_string(),
                        });
                    }

                    tokio::time::sleep(self.settings.poll_interval).await;
                    waited += self.settings.poll_interval;
                    debug!(id = %id, waited = ?waited, "polling prediction status");
                    prediction = self.poll(&id).await?;
                }
            }
        }

        let output = prediction
            .output
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                FabricaError::MissingArtifact("job output is missing or null".to_string())
            })?;

        let url = resolve_output(output).ok_or_else(|| {
            FabricaError::MissingArtifact(format!("unrecognized output shape: {output}"))
        })?;

        self.download_artifact(&url).await
    }

    /// Submits a new prediction job. A single POST; HTTP-level rejection
    /// is terminal for the call.
    pub async fn submit(
        &self,
        prompt: &str,
        image_ref: Option<&str>,
    ) -> Result<Prediction, FabricaError> {
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            FabricaError::Config(
                "mesh.api_key is not set; cannot submit 3D generation jobs".to_string(),
            )
        })?;

        let payload = build_submit_payload(&self.settings.model_id, prompt, image_ref)?;
        debug!(model = %self.settings.model_id, "submitting prediction");

        let response = self
            .http
            .post(&self.settings.base_url)
            .header("x-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("prediction submit failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        Self::parse_prediction(response).await
    }

    /// Fetches the current status of a prediction by id.
    pub async fn poll(&self, id: &str) -> Result<Prediction, FabricaError> {
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            FabricaError::Config("mesh.api_key is not set; cannot poll jobs".to_string())
        })?;

        let url = format!("{}/{}", self.settings.base_url, id);
        let response = self
            .http
            .get(&url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("prediction poll failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        Self::parse_prediction(response).await
    }

    async fn parse_prediction(response: reqwest::Response) -> Result<Prediction, FabricaError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FabricaError::Service {
                message: format!("3D provider returned {status}: {}", error_detail(&body)),
                source: None,
            });
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| FabricaError::Service {
                message: format!("failed to parse prediction response: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Downloads a resolved artifact reference.
    async fn download_artifact(&self, url: &str) -> Result<ModelArtifact, FabricaError> {
        debug!(url = %url, "downloading model artifact");

        let response =
            self.download
                .get(url)
                .send()
                .await
                .map_err(|e| FabricaError::Download {
                    message: format!("network error fetching artifact: {e}"),
                    source: Some(Box::new(e)),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FabricaError::Download {
                message: format!("artifact fetch returned {status}"),
                source: None,
            });
        }

        let header_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FabricaError::Download {
                message: format!("failed to read artifact bytes: {e}"),
                source: Some(Box::new(e)),
            })?
            .to_vec();

        let url_extension = extension_from_url(url);
        let content_type = url_extension
            .as_deref()
            .and_then(content_type_for_extension)
            .map(str::to_string)
            .or(header_content_type)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let extension = url_extension.unwrap_or_else(|| ".glb".to_string());

        debug!(bytes = bytes.len(), content_type = %content_type, "artifact downloaded");

        Ok(ModelArtifact {
            bytes,
            content_type,
            extension,
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

/// Extracts a file extension (with leading dot) from a URL's path,
/// ignoring query string and fragment.
fn extension_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let basename = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = basename.rsplit_once('.')?;
    if !ext.is_empty() && ext.len() <= 6 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(format!(".{ext}"))
    } else {
        None
    }
}

/// Known model file extensions and their content types.
fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        ".glb" => Some("model/gltf-binary"),
        ".gltf" => Some("model/gltf+json"),
        ".obj" => Some("model/obj"),
        _ => None,
    }
}
