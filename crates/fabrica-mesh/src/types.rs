// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the 3D-generation provider's prediction API.

use serde::Deserialize;
use serde_json::json;

use fabrica_core::FabricaError;

/// Model id that performs image-to-3D generation and requires an input
/// image reference.
pub const HUNYUAN_MODEL_ID: &str = "tencent/hunyuan3d-2";

/// Lifecycle status of a remote prediction job.
///
/// The provider reports statuses as lowercase strings; anything outside
/// the known lifecycle is preserved in `Unknown` so error messages can
/// show what the provider actually said.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unknown(String),
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "starting" => JobStatus::Starting,
            "processing" => JobStatus::Processing,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "canceled" => JobStatus::Canceled,
            _ => JobStatus::Unknown(raw),
        }
    }
}

impl JobStatus {
    /// Terminal statuses end the job's lifecycle; no further transition
    /// occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown(raw) => raw,
        };
        f.write_str(s)
    }
}

/// One prediction as reported by the provider's submit and poll endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    pub status: JobStatus,
    /// Result payload; its shape is not fixed, see [`JobOutput`].
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The accepted shapes of a successful prediction's result payload.
///
/// Variant declaration order is the probe order: an object map with a
/// `url` field, a list of URL strings, a list of maps with `url` fields,
/// or a direct URL string. Any other shape fails to parse and is treated
/// as an artifact-resolution failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    UrlObject { url: String },
    UrlList(Vec<String>),
    ObjectList(Vec<OutputObject>),
    Url(String),
}

/// A single `{url}` entry inside a list-shaped result payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputObject {
    pub url: String,
}

impl JobOutput {
    /// Extracts the artifact URL, if any.
    ///
    /// Bare strings must look like URLs (the provider also uses string
    /// output for log text on some models); object `url` fields are
    /// trusted as-is.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            JobOutput::UrlObject { url } => Some(url),
            JobOutput::UrlList(urls) => urls
                .first()
                .map(String::as_str)
                .filter(|u| u.starts_with("http")),
            JobOutput::ObjectList(objects) => objects.first().map(|o| o.url.as_str()),
            JobOutput::Url(url) => Some(url.as_str()).filter(|u| u.starts_with("http")),
        }
    }
}

/// Resolves an artifact URL from a raw result payload, failing closed on
/// unrecognized shapes.
pub fn resolve_output(value: &serde_json::Value) -> Option<String> {
    serde_json::from_value::<JobOutput>(value.clone())
        .ok()
        .and_then(|output| output.resolve().map(str::to_string))
}

/// Builds the submit payload for `model_id`.
///
/// The hunyuan model is image-to-3D and refuses to run without an input
/// image reference; other models get the generic text-to-3D payload with
/// the image attached opportunistically.
pub(crate) fn build_submit_payload(
    model_id: &str,
    prompt: &str,
    image_ref: Option<&str>,
) -> Result<serde_json::Value, FabricaError> {
    let input = if model_id == HUNYUAN_MODEL_ID {
        let image = image_ref.ok_or_else(|| {
            FabricaError::Config(format!(
                "an input image reference is required for model `{model_id}`"
            ))
        })?;
        json!({
            "caption": prompt,
            "image": image,
            "steps": 10,
            "guidance_scale": 5.5,
            "octree_resolution": 256,
            "shape_only": false,
        })
    } else {
        let mut input = json!({
            "prompt": prompt,
            "num_inference_steps": 10,
            "guidance_scale": 5.5,
            "octree_resolution": 256,
            "face_count": 40000,
            "texture": true,
        });
        if let Some(image) = image_ref {
            input["image"] = json!(image);
        }
        input
    };

    Ok(json!({ "model": model_id, "input": input }))
}
