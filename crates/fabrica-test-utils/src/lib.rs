// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fabrica integration tests.
//!
//! Provides the in-memory artifact store double used by pipeline and CLI
//! tests, for fast, deterministic, CI-runnable tests without external
//! services.

pub mod memory_store;

pub use memory_store::{MemoryStore, StoredObject};
