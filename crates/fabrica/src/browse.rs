// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fabrica browse` and `fabrica show` command implementations.
//!
//! Terminal counterpart of the original viewer: list stored artifacts
//! (metadata entries labelled by their user prompt) and render one
//! metadata document with minted URLs for its linked image and model.

use std::time::Duration;

use fabrica_config::FabricaConfig;
use fabrica_core::FabricaError;
use fabrica_core::types::keys;

use crate::setup::open_configured_store;

/// Lists object keys of one artifact kind.
pub async fn run_browse(config: &FabricaConfig, kind: &str) -> Result<(), FabricaError> {
    let store = open_configured_store(config)?;

    let prefix = match kind {
        "metadata" => keys::METADATA_PREFIX,
        "images" => keys::IMAGE_PREFIX,
        "models" => keys::MODEL_PREFIX,
        other => {
            return Err(FabricaError::Config(format!(
                "unknown kind `{other}`; use metadata, images, or models"
            )));
        }
    };

    let listed = store.list(prefix).await?;
    if listed.is_empty() {
        println!("no objects under {prefix}");
        return Ok(());
    }

    for key in listed {
        if prefix == keys::METADATA_PREFIX {
            // Label each document with the prompt that produced it, like
            // the original viewer's dropdown.
            let label = match store.get_json(&key).await {
                Ok(doc) => doc
                    .get("_user_prompt")
                    .and_then(|v| v.as_str())
                    .unwrap_or("(no prompt)")
                    .to_string(),
                Err(_) => "(unreadable)".to_string(),
            };
            println!("{key}  {label}");
        } else {
            println!("{key}");
        }
    }

    Ok(())
}

/// Prints one metadata document and mints URLs for its linked artifacts.
pub async fn run_show(config: &FabricaConfig, key: &str) -> Result<(), FabricaError> {
    let store = open_configured_store(config)?;
    let ttl = Duration::from_secs(config.store.presign_ttl_secs);

    let doc = store.get_json(key).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&doc)
            .map_err(|e| FabricaError::Internal(format!("metadata render failed: {e}")))?
    );

    // Prefer the intermediate image key, falling back to the plain image
    // key, the way the original viewer resolves linked images.
    let image_key = doc
        .get("intermediate_image_s3_key")
        .or_else(|| doc.get("image_s3_key"))
        .and_then(|v| v.as_str());

    if let Some(image_key) = image_key {
        match store.presign_get(image_key, ttl).await {
            Ok(url) => println!("image: {url}"),
            Err(err) => println!("image: {image_key} (no URL: {err})"),
        }
    }

    if let Some(model_key) = doc.get("model_s3_key").and_then(|v| v.as_str()) {
        match store.presign_get(model_key, ttl).await {
            Ok(url) => println!("model: {url}"),
            Err(err) => println!("model: {model_key} (no URL: {err})"),
        }
    }

    Ok(())
}
