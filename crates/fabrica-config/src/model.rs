// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fabrica asset pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Fabrica configuration.
///
/// Loaded from TOML files with environment variable overrides. All
/// sections are optional and default to sensible values; the store
/// section additionally requires credentials before uploads are enabled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FabricaConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Prompt-expansion service settings.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Text-to-image service settings.
    #[serde(default)]
    pub image: ImageConfig,

    /// Image-to-3D generation service settings.
    #[serde(default)]
    pub mesh: MeshConfig,

    /// Object store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Application-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Prompt-expansion service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Base URL of the prompt-expansion service.
    #[serde(default = "default_prompt_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_prompt_timeout")]
    pub timeout_secs: u64,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            endpoint: default_prompt_endpoint(),
            timeout_secs: default_prompt_timeout(),
        }
    }
}

fn default_prompt_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_prompt_timeout() -> u64 {
    30
}

/// Text-to-image service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Base URL of the text-to-image service.
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds. Image generation is slow on CPU
    /// backends, so this is much larger than the prompt timeout.
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_image_endpoint(),
            timeout_secs: default_image_timeout(),
        }
    }
}

fn default_image_endpoint() -> String {
    "http://localhost:8001".to_string()
}

fn default_image_timeout() -> u64 {
    120
}

/// Image-to-3D generation service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MeshConfig {
    /// Predictions endpoint of the 3D generation provider.
    #[serde(default = "default_mesh_endpoint")]
    pub endpoint: String,

    /// Provider API key. `None` disables 3D generation.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider model identifier.
    #[serde(default = "default_mesh_model")]
    pub model_id: String,

    /// Seconds between job-status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Overall wall-clock budget for polling, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Timeout for individual submit/poll HTTP calls, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for downloading the finished model artifact, in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            endpoint: default_mesh_endpoint(),
            api_key: None,
            model_id: default_mesh_model(),
            poll_interval_secs: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
            request_timeout_secs: default_request_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

fn default_mesh_endpoint() -> String {
    "https://api.synexa.ai/v1/predictions".to_string()
}

fn default_mesh_model() -> String {
    "tencent/hunyuan3d-2".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_poll_timeout() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    300
}

/// Object store configuration.
///
/// The store is considered configured only when `bucket`,
/// `access_key_id`, and `secret_access_key` are all set; otherwise every
/// store operation reports "unavailable" and the pipeline degrades to
/// recording the omission in metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Bucket name. `None` disables the store.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Region for request signing.
    #[serde(default = "default_region")]
    pub region: String,

    /// Access key id for request signing.
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key for request signing.
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Endpoint override for S3-compatible stores (e.g. MinIO).
    /// Defaults to the regional AWS endpoint when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Lifetime of minted read URLs, in seconds.
    #[serde(default = "default_presign_ttl")]
    pub presign_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            presign_ttl_secs: default_presign_ttl(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_presign_ttl() -> u64 {
    3600
}

impl StoreConfig {
    /// True when enough of the section is set to attempt real uploads.
    pub fn is_configured(&self) -> bool {
        self.bucket.is_some() && self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}
