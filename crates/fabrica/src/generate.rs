// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fabrica generate` command implementation.

use std::time::Duration;

use fabrica_config::FabricaConfig;
use fabrica_core::{FabricaError, GenerationRequest, OutputKind};

use crate::setup::build_pipeline;

/// Runs the pipeline for one prompt and prints the run report.
pub async fn run(
    config: &FabricaConfig,
    prompt: &str,
    output: &str,
    image_ref: Option<String>,
) -> Result<(), FabricaError> {
    if prompt.trim().is_empty() {
        return Err(FabricaError::Config("prompt must not be empty".to_string()));
    }

    let output_kind = output
        .parse::<OutputKind>()
        .unwrap_or_else(|_| OutputKind::Other(output.to_string()));

    let (pipeline, store) = build_pipeline(config)?;

    let mut request = GenerationRequest::new(prompt, output_kind);
    request.input_image_reference = image_ref;

    let report = pipeline.run(&request).await?;

    println!("{}", report.metadata_json);
    println!();
    println!("asset id: {}", report.asset_id);

    let ttl = Duration::from_secs(config.store.presign_ttl_secs);
    for (label, key) in [
        ("image", report.image_key.as_deref()),
        ("model", report.model_key.as_deref()),
    ] {
        if let Some(key) = key {
            match store.presign_get(key, ttl).await {
                Ok(url) => println!("{label}: {key}\n  {url}"),
                Err(err) => println!("{label}: {key} (no download URL: {err})"),
            }
        }
    }

    match report.errors_joined() {
        Some(errors) => println!("completed with errors: {errors}"),
        None => println!("completed without errors"),
    }

    Ok(())
}
