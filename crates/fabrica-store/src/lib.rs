// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3-compatible artifact store gateway for Fabrica.
//!
//! Provides [`S3Store`], a path-style S3 REST client with SigV4 signing,
//! and [`DisabledStore`], the uniform-failure stand-in used when the
//! store is unconfigured.

mod disabled;
mod s3;
mod sigv4;

use std::sync::Arc;

use tracing::warn;

use fabrica_core::{ArtifactStore, FabricaError};

pub use disabled::DisabledStore;
pub use s3::{S3Settings, S3Store};

/// Opens the artifact store described by `settings`, or the disabled
/// stand-in when `None`.
pub fn open_store(settings: Option<S3Settings>) -> Result<Arc<dyn ArtifactStore>, FabricaError> {
    match settings {
        Some(settings) => Ok(Arc::new(S3Store::new(settings)?)),
        None => {
            warn!("object store not configured; artifacts will not be persisted");
            Ok(Arc::new(DisabledStore))
        }
    }
}
