// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./fabrica.toml` > `~/.config/fabrica/fabrica.toml` with
//! environment variable overrides via the `FABRICA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FabricaConfig;

/// Load configuration from the standard file hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/fabrica/fabrica.toml` (user XDG config)
/// 3. `./fabrica.toml` (local directory)
/// 4. `FABRICA_*` environment variables
pub fn load_config() -> Result<FabricaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FabricaConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fabrica/fabrica.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fabrica.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FabricaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FabricaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FabricaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FabricaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FABRICA_STORE_ACCESS_KEY_ID` must map
/// to `store.access_key_id`, not `store.access.key.id`.
fn env_provider() -> Env {
    Env::prefixed("FABRICA_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: FABRICA_MESH_POLL_INTERVAL_SECS -> "mesh_poll_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("prompt_", "prompt.", 1)
            .replacen("image_", "image.", 1)
            .replacen("mesh_", "mesh.", 1)
            .replacen("store_", "store.", 1);
        mapped.into()
    })
}
