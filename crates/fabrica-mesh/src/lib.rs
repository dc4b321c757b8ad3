// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image-to-3D generation client and async job poller.
//!
//! This crate wraps the 3D-generation provider's prediction API: a job is
//! submitted with a single POST, polled by id until it reaches a terminal
//! status or the wall-clock budget is exhausted, its output artifact URL
//! resolved from a closed set of accepted payload shapes, and the bytes
//! downloaded with a separate long-timeout client.

mod client;
mod types;

pub use client::{MeshClient, MeshSettings, ModelArtifact};
pub use types::{HUNYUAN_MODEL_ID, JobOutput, JobStatus, OutputObject, Prediction, resolve_output};
