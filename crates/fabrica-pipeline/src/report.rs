// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured run results: per-stage error records and the run report.

use strum::Display;

use fabrica_core::{AssetId, FabricaError};

/// The non-fatal pipeline stage an error was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(to_string = "image generation")]
    ImageGeneration,
    #[strum(to_string = "image upload")]
    ImageUpload,
    #[strum(to_string = "image URL minting")]
    ImageUrlMinting,
    #[strum(to_string = "model generation")]
    ModelGeneration,
    #[strum(to_string = "model upload")]
    ModelUpload,
    #[strum(to_string = "output selection")]
    OutputSelection,
}

/// Failure-taxonomy bucket of a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StageErrorKind {
    #[strum(to_string = "configuration")]
    Configuration,
    #[strum(to_string = "remote call")]
    RemoteCall,
    #[strum(to_string = "job lifecycle")]
    JobLifecycle,
    #[strum(to_string = "artifact resolution")]
    ArtifactResolution,
    #[strum(to_string = "persistence")]
    Persistence,
    #[strum(to_string = "internal")]
    Internal,
}

impl StageErrorKind {
    /// Buckets a pipeline error into the failure taxonomy.
    pub fn classify(err: &FabricaError) -> Self {
        match err {
            FabricaError::Config(_) => StageErrorKind::Configuration,
            FabricaError::Service { .. } | FabricaError::Download { .. } => {
                StageErrorKind::RemoteCall
            }
            FabricaError::JobFailed { .. }
            | FabricaError::JobTimeout { .. }
            | FabricaError::UnknownJobStatus(_) => StageErrorKind::JobLifecycle,
            FabricaError::MissingArtifact(_) => StageErrorKind::ArtifactResolution,
            FabricaError::Store { .. } | FabricaError::StoreUnavailable => {
                StageErrorKind::Persistence
            }
            FabricaError::Internal(_) => StageErrorKind::Internal,
        }
    }
}

/// One non-fatal error recorded during a pipeline run.
///
/// These accumulate instead of aborting the run; the presentation layer
/// formats them for display.
#[derive(Debug, Clone)]
pub struct StageError {
    pub stage: Stage,
    pub kind: StageErrorKind,
    pub detail: String,
}

impl StageError {
    pub fn new(stage: Stage, err: &FabricaError) -> Self {
        Self {
            stage,
            kind: StageErrorKind::classify(err),
            detail: err.to_string(),
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.detail)
    }
}

/// The outcome of one successful pipeline run.
///
/// "Successful" means the metadata document was persisted; individual
/// artifact stages may still have failed and are reported in `errors`.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier namespacing every object this run persisted.
    pub asset_id: AssetId,
    /// The metadata document exactly as persisted (pretty-printed JSON).
    pub metadata_json: String,
    /// Object key of the generated image, when that stage succeeded.
    pub image_key: Option<String>,
    /// Object key of the generated model, when that stage succeeded.
    pub model_key: Option<String>,
    /// Non-fatal errors recorded along the way, in stage order.
    pub errors: Vec<StageError>,
}

impl RunReport {
    /// Renders the accumulated errors as one pipe-joined line for
    /// display, or `None` when every stage succeeded.
    pub fn errors_joined(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }
}
