// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into clients, store, and pipeline.

use std::sync::Arc;
use std::time::Duration;

use fabrica_config::FabricaConfig;
use fabrica_config::model::StoreConfig;
use fabrica_core::{ArtifactStore, FabricaError};
use fabrica_image::ImageClient;
use fabrica_mesh::{MeshClient, MeshSettings};
use fabrica_pipeline::Pipeline;
use fabrica_prompt::PromptClient;
use fabrica_store::{S3Settings, open_store};

/// Maps the store section onto gateway settings, or `None` when the
/// section is incomplete.
pub fn store_settings(store: &StoreConfig) -> Option<S3Settings> {
    match (&store.bucket, &store.access_key_id, &store.secret_access_key) {
        (Some(bucket), Some(access_key_id), Some(secret_access_key)) => Some(S3Settings {
            bucket: bucket.clone(),
            region: store.region.clone(),
            access_key_id: access_key_id.clone(),
            secret_access_key: secret_access_key.clone(),
            endpoint: store.endpoint.clone(),
        }),
        _ => None,
    }
}

/// Opens the configured artifact store (or the disabled stand-in).
pub fn open_configured_store(
    config: &FabricaConfig,
) -> Result<Arc<dyn ArtifactStore>, FabricaError> {
    open_store(store_settings(&config.store))
}

/// Builds the full pipeline plus a handle to its store.
pub fn build_pipeline(
    config: &FabricaConfig,
) -> Result<(Pipeline, Arc<dyn ArtifactStore>), FabricaError> {
    let prompt = PromptClient::new(
        &config.prompt.endpoint,
        Duration::from_secs(config.prompt.timeout_secs),
    )?;
    let image = ImageClient::new(
        &config.image.endpoint,
        Duration::from_secs(config.image.timeout_secs),
    )?;
    let mesh = MeshClient::new(MeshSettings {
        base_url: config.mesh.endpoint.clone(),
        api_key: config.mesh.api_key.clone(),
        model_id: config.mesh.model_id.clone(),
        poll_interval: Duration::from_secs(config.mesh.poll_interval_secs),
        poll_timeout: Duration::from_secs(config.mesh.poll_timeout_secs),
        request_timeout: Duration::from_secs(config.mesh.request_timeout_secs),
        download_timeout: Duration::from_secs(config.mesh.download_timeout_secs),
    })?;

    let store = open_configured_store(config)?;
    let pipeline = Pipeline::new(
        prompt,
        image,
        mesh,
        Arc::clone(&store),
        Duration::from_secs(config.store.presign_ttl_secs),
    );

    Ok((pipeline, store))
}
