// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-in store used when no object store is configured.

use std::time::Duration;

use async_trait::async_trait;

use fabrica_core::{ArtifactStore, FabricaError};

/// An [`ArtifactStore`] whose every operation fails uniformly with
/// [`FabricaError::StoreUnavailable`].
///
/// Installed when the store section of the configuration is incomplete,
/// so the pipeline degrades to recording the omission in metadata instead
/// of crashing.
pub struct DisabledStore;

#[async_trait]
impl ArtifactStore for DisabledStore {
    async fn put(
        &self,
        _key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), FabricaError> {
        Err(FabricaError::StoreUnavailable)
    }

    async fn presign_get(&self, _key: &str, _ttl: Duration) -> Result<String, FabricaError> {
        Err(FabricaError::StoreUnavailable)
    }

    async fn list(&self, _prefix: &str) -> Result<Vec<String>, FabricaError> {
        Err(FabricaError::StoreUnavailable)
    }

    async fn get_json(&self, _key: &str) -> Result<serde_json::Value, FabricaError> {
        Err(FabricaError::StoreUnavailable)
    }
}
