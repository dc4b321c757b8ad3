// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fabrica asset pipeline.

use thiserror::Error;

/// The primary error type used across all Fabrica crates.
///
/// Variants follow the pipeline's failure taxonomy: configuration errors,
/// remote-call errors, job-lifecycle errors, artifact-resolution errors,
/// and persistence errors are all distinguishable by the caller.
#[derive(Debug, Error)]
pub enum FabricaError {
    /// Configuration errors (missing endpoint, missing credential, bad value).
    /// No network call was attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote generation-service errors (non-2xx, timeout, connection refused).
    #[error("service error: {message}")]
    Service {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A polled job reached a terminal `failed` or `canceled` status.
    #[error("remote job {status}: {detail}")]
    JobFailed { status: String, detail: String },

    /// The polling loop exhausted its wall-clock budget before the job
    /// reached a terminal status.
    #[error("polling timed out after {waited_secs}s (last status: {last_status})")]
    JobTimeout { waited_secs: u64, last_status: String },

    /// The remote job reported a status outside the known lifecycle.
    #[error("remote job returned unrecognized status `{0}`")]
    UnknownJobStatus(String),

    /// A job succeeded but its result payload contained no usable
    /// artifact reference.
    #[error("no artifact reference in job output: {0}")]
    MissingArtifact(String),

    /// Fetching a resolved artifact reference failed (network error or
    /// non-success download status).
    #[error("artifact download failed: {message}")]
    Download {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The object store rejected an operation.
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The object store is not configured; no upload, listing, or URL
    /// minting is possible.
    #[error("artifact store is not configured")]
    StoreUnavailable,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
