// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact store trait implemented by object-store gateways.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FabricaError;

/// Gateway to the object store that holds every persisted artifact.
///
/// The pipeline treats each operation as fallible and never assumes the
/// store is available: an unconfigured deployment provides an
/// implementation whose every call fails with
/// [`FabricaError::StoreUnavailable`].
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads a byte blob under `key` with an explicit content type.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FabricaError>;

    /// Mints a time-limited, publicly resolvable read URL for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, FabricaError>;

    /// Lists object keys under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, FabricaError>;

    /// Fetches an object and parses it as a JSON document.
    async fn get_json(&self, key: &str) -> Result<serde_json::Value, FabricaError>;
}
