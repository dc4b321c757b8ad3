// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Fabrica workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for one pipeline run.
///
/// The asset id is the join key across every object the run persists:
/// the metadata document, the image object, and the model object all embed
/// it in their keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    /// Generates a fresh, unique asset identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The artifact kind a user asked the pipeline to produce.
///
/// Parsing is lenient: anything that is not a known kind lands in
/// `Other`, which the pipeline records as an `output_type_error`
/// annotation instead of rejecting the request outright.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OutputKind {
    /// A single generated image.
    #[strum(to_string = "Image")]
    Image,

    /// A 3D model, generated from an intermediate image.
    #[strum(to_string = "3D Model", serialize = "3d-model", serialize = "model")]
    Model,

    /// An unrecognized output kind, preserved verbatim for error reporting.
    #[strum(default)]
    Other(String),
}

/// One user submission to the pipeline. Immutable once created.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The raw user prompt.
    pub prompt: String,

    /// Requested artifact kind.
    pub output_kind: OutputKind,

    /// Optional pre-existing image reference to feed the 3D stage,
    /// bypassing intermediate image generation.
    pub input_image_reference: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, output_kind: OutputKind) -> Self {
        Self {
            prompt: prompt.into(),
            output_kind,
            input_image_reference: None,
        }
    }
}

/// Object-key layout of the artifact store.
///
/// One prefix per artifact kind; every key under a prefix embeds the
/// asset id of the run that produced it.
pub mod keys {
    use super::AssetId;

    pub const METADATA_PREFIX: &str = "metadata/";
    pub const IMAGE_PREFIX: &str = "images/";
    pub const MODEL_PREFIX: &str = "models/";

    /// Key of the run's metadata document.
    pub fn metadata(asset_id: &AssetId) -> String {
        format!("{METADATA_PREFIX}{asset_id}.json")
    }

    /// Key of the run's generated (or intermediate) image.
    pub fn image(asset_id: &AssetId) -> String {
        format!("{IMAGE_PREFIX}{asset_id}.png")
    }

    /// Key of the run's 3D model, with the extension of the downloaded
    /// artifact (e.g. ".glb").
    pub fn model(asset_id: &AssetId, extension: &str) -> String {
        format!("{MODEL_PREFIX}{asset_id}{extension}")
    }
}
