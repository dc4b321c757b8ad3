// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pipeline orchestrator.
//!
//! One [`Pipeline::run`] per user request: expand the prompt, branch on
//! the requested output kind, generate and persist artifacts, then
//! persist the metadata document. Prompt expansion and metadata
//! persistence are the only fatal stages; everything in between records
//! its failure and lets the run continue.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use fabrica_core::types::keys;
use fabrica_core::{ArtifactStore, AssetId, FabricaError, GenerationRequest, OutputKind};
use fabrica_image::ImageClient;
use fabrica_mesh::MeshClient;
use fabrica_prompt::PromptClient;

use crate::report::{RunReport, Stage, StageError, StageErrorKind};

/// Metadata field holding the expansion document when the service
/// returns something other than a JSON object.
const EXPANSION_FIELD: &str = "expansion";

/// The asset-generation pipeline.
///
/// Every collaborator is passed in at construction, so tests can point
/// the clients at mock servers and swap the store for an in-memory
/// double without touching process environment.
pub struct Pipeline {
    prompt: PromptClient,
    image: ImageClient,
    mesh: MeshClient,
    store: Arc<dyn ArtifactStore>,
    presign_ttl: Duration,
}

impl Pipeline {
    pub fn new(
        prompt: PromptClient,
        image: ImageClient,
        mesh: MeshClient,
        store: Arc<dyn ArtifactStore>,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            prompt,
            image,
            mesh,
            store,
            presign_ttl,
        }
    }

    /// Runs the pipeline for one request.
    ///
    /// Returns `Ok(RunReport)` when the metadata document was persisted
    /// (possibly with recorded stage errors), or `Err` when prompt
    /// expansion or the final persistence failed. On a fatal persistence
    /// failure, artifacts uploaded by earlier stages stay in the store as
    /// orphans; there is no compensating cleanup.
    pub async fn run(&self, request: &GenerationRequest) -> Result<RunReport, FabricaError> {
        if request.prompt.trim().is_empty() {
            return Err(FabricaError::Config("prompt must not be empty".to_string()));
        }

        info!(prompt = %request.prompt, kind = %request.output_kind, "starting pipeline run");

        // Fatal stage: no expansion document, no run.
        let expansion = self.prompt.expand(&request.prompt).await?;

        let mut metadata = match expansion {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert(EXPANSION_FIELD.to_string(), other);
                map
            }
        };

        // Generation uses the expanded prompt when the expansion document
        // provides one.
        let generation_prompt = metadata
            .get("expanded_prompt")
            .and_then(Value::as_str)
            .unwrap_or(&request.prompt)
            .to_string();

        metadata.insert(
            "_user_prompt".to_string(),
            Value::String(request.prompt.clone()),
        );
        metadata.insert(
            "_selected_output_type".to_string(),
            Value::String(request.output_kind.to_string()),
        );

        let asset_id = AssetId::generate();
        let mut errors: Vec<StageError> = Vec::new();
        let mut image_key = None;
        let mut model_key = None;

        match &request.output_kind {
            OutputKind::Image => {
                let key = keys::image(&asset_id);
                match self.image_stage(&generation_prompt, &key).await {
                    Ok(()) => {
                        metadata.insert("image_s3_key".to_string(), Value::String(key.clone()));
                        image_key = Some(key);
                    }
                    Err((stage, err)) => {
                        let field = match stage {
                            Stage::ImageGeneration => "image_generation_error",
                            _ => "image_s3_error",
                        };
                        warn!(stage = %stage, error = %err, "image stage failed");
                        metadata.insert(field.to_string(), Value::String(err.to_string()));
                        errors.push(StageError::new(stage, &err));
                    }
                }
            }

            OutputKind::Model => {
                // The 3D stage needs a resolvable image reference: either
                // one the caller supplied, or an intermediate image
                // generated and presigned here. Without a reference the
                // poller is never invoked.
                let mesh_image_ref = match &request.input_image_reference {
                    Some(reference) => Some(reference.clone()),
                    None => {
                        let key = keys::image(&asset_id);
                        match self.image_stage(&generation_prompt, &key).await {
                            Ok(()) => {
                                metadata.insert(
                                    "intermediate_image_s3_key".to_string(),
                                    Value::String(key.clone()),
                                );
                                match self.store.presign_get(&key, self.presign_ttl).await {
                                    Ok(url) => Some(url),
                                    Err(err) => {
                                        warn!(error = %err, "minting intermediate image URL failed");
                                        metadata.insert(
                                            "intermediate_image_url_error".to_string(),
                                            Value::String(err.to_string()),
                                        );
                                        errors.push(StageError::new(Stage::ImageUrlMinting, &err));
                                        None
                                    }
                                }
                            }
                            Err((stage, err)) => {
                                let field = match stage {
                                    Stage::ImageGeneration => "intermediate_image_generation_error",
                                    _ => "intermediate_image_s3_error",
                                };
                                warn!(stage = %stage, error = %err, "intermediate image stage failed");
                                metadata
                                    .insert(field.to_string(), Value::String(err.to_string()));
                                errors.push(StageError::new(stage, &err));
                                None
                            }
                        }
                    }
                };

                if let Some(reference) = mesh_image_ref {
                    match self
                        .mesh
                        .generate(&generation_prompt, Some(reference.as_str()))
                        .await
                    {
                        Ok(artifact) => {
                            let key = keys::model(&asset_id, &artifact.extension);
                            match self
                                .store
                                .put(&key, artifact.bytes, &artifact.content_type)
                                .await
                            {
                                Ok(()) => {
                                    metadata.insert(
                                        "model_s3_key".to_string(),
                                        Value::String(key.clone()),
                                    );
                                    model_key = Some(key);
                                }
                                Err(err) => {
                                    warn!(error = %err, "model upload failed");
                                    metadata.insert(
                                        "model_s3_error".to_string(),
                                        Value::String(err.to_string()),
                                    );
                                    errors.push(StageError::new(Stage::ModelUpload, &err));
                                }
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "model generation failed");
                            metadata.insert(
                                "model_generation_error".to_string(),
                                Value::String(err.to_string()),
                            );
                            errors.push(StageError::new(Stage::ModelGeneration, &err));
                        }
                    }
                }
            }

            OutputKind::Other(kind) => {
                let detail = format!("unknown output type: {kind}");
                warn!(kind = %kind, "request carried an unknown output type");
                metadata.insert(
                    "output_type_error".to_string(),
                    Value::String(detail.clone()),
                );
                errors.push(StageError {
                    stage: Stage::OutputSelection,
                    kind: StageErrorKind::Configuration,
                    detail,
                });
            }
        }

        // Fatal stage: the run only counts when its metadata document is
        // persisted.
        let metadata_json = serde_json::to_string_pretty(&Value::Object(metadata))
            .map_err(|e| FabricaError::Internal(format!("metadata serialization failed: {e}")))?;

        self.store
            .put(
                &keys::metadata(&asset_id),
                metadata_json.clone().into_bytes(),
                "application/json",
            )
            .await?;

        info!(asset_id = %asset_id, errors = errors.len(), "pipeline run complete");

        Ok(RunReport {
            asset_id,
            metadata_json,
            image_key,
            model_key,
            errors,
        })
    }

    /// Generates an image and uploads it under `key`, identifying which
    /// of the two sub-steps failed.
    async fn image_stage(&self, prompt: &str, key: &str) -> Result<(), (Stage, FabricaError)> {
        let artifact = self
            .image
            .generate(prompt)
            .await
            .map_err(|e| (Stage::ImageGeneration, e))?;

        self.store
            .put(key, artifact.bytes, &artifact.content_type)
            .await
            .map_err(|e| (Stage::ImageUpload, e))?;

        Ok(())
    }
}
