// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `ArtifactStore` double for deterministic testing.
//!
//! `MemoryStore` implements [`ArtifactStore`] over a `HashMap`, enabling
//! fast, CI-runnable pipeline tests without an object store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use fabrica_core::{ArtifactStore, FabricaError};

/// One stored object: bytes plus the content type it was uploaded with.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A `HashMap`-backed artifact store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stored object, if present.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Returns every stored key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FabricaError> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, FabricaError> {
        if self.object(key).is_none() {
            return Err(FabricaError::Store {
                message: format!("no such key: {key}"),
                source: None,
            });
        }
        Ok(format!("memory://{key}?expires={}", ttl.as_secs()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, FabricaError> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    async fn get_json(&self, key: &str) -> Result<serde_json::Value, FabricaError> {
        let object = self.object(key).ok_or_else(|| FabricaError::Store {
            message: format!("no such key: {key}"),
            source: None,
        })?;
        serde_json::from_slice(&object.bytes).map_err(|e| FabricaError::Store {
            message: format!("object `{key}` is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
