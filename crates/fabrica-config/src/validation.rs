// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty endpoints, sane polling budgets, and
//! all-or-nothing store credentials.

use crate::diagnostic::ConfigError;
use crate::model::FabricaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &FabricaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (section, endpoint) in [
        ("prompt", &config.prompt.endpoint),
        ("image", &config.image.endpoint),
        ("mesh", &config.mesh.endpoint),
    ] {
        if endpoint.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{section}.endpoint must not be empty"),
            });
        } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "{section}.endpoint `{endpoint}` must start with http:// or https://"
                ),
            });
        }
    }

    if config.mesh.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "mesh.poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.mesh.poll_timeout_secs < config.mesh.poll_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "mesh.poll_timeout_secs ({}) must be at least mesh.poll_interval_secs ({})",
                config.mesh.poll_timeout_secs, config.mesh.poll_interval_secs
            ),
        });
    }

    if config.store.presign_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.presign_ttl_secs must be at least 1".to_string(),
        });
    }

    // Store credentials are all-or-nothing: a partially configured store
    // would silently behave as disabled, which is harder to debug than
    // an explicit startup error.
    let store_fields = [
        ("store.bucket", config.store.bucket.is_some()),
        ("store.access_key_id", config.store.access_key_id.is_some()),
        (
            "store.secret_access_key",
            config.store.secret_access_key.is_some(),
        ),
    ];
    let set_count = store_fields.iter().filter(|(_, set)| *set).count();
    if set_count > 0 && set_count < store_fields.len() {
        let missing: Vec<&str> = store_fields
            .iter()
            .filter(|(_, set)| !*set)
            .map(|(name, _)| *name)
            .collect();
        errors.push(ConfigError::Validation {
            message: format!(
                "store is partially configured; also set {}",
                missing.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = FabricaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_endpoint_fails_validation() {
        let mut config = FabricaConfig::default();
        config.prompt.endpoint = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("prompt.endpoint")
        )));
    }

    #[test]
    fn non_http_endpoint_fails_validation() {
        let mut config = FabricaConfig::default();
        config.mesh.endpoint = "ftp://somewhere".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("mesh.endpoint")
        )));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = FabricaConfig::default();
        config.mesh.poll_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("poll_interval_secs")
        )));
    }

    #[test]
    fn poll_timeout_below_interval_fails_validation() {
        let mut config = FabricaConfig::default();
        config.mesh.poll_interval_secs = 10;
        config.mesh.poll_timeout_secs = 5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("poll_timeout_secs")
        )));
    }

    #[test]
    fn partial_store_credentials_fail_validation() {
        let mut config = FabricaConfig::default();
        config.store.bucket = Some("assets".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message }
                if message.contains("partially configured")
                    && message.contains("store.access_key_id")
        )));
    }

    #[test]
    fn complete_store_credentials_pass_validation() {
        let mut config = FabricaConfig::default();
        config.store.bucket = Some("assets".to_string());
        config.store.access_key_id = Some("AKIA...".to_string());
        config.store.secret_access_key = Some("secret".to_string());
        assert!(validate_config(&config).is_ok());
        assert!(config.store.is_configured());
    }
}
