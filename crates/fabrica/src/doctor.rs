// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fabrica doctor` command implementation.
//!
//! Runs diagnostic checks against the Fabrica environment to identify
//! configuration issues and connectivity problems before a run wastes a
//! long generation job on them.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use fabrica_config::FabricaConfig;
use fabrica_core::FabricaError;

use crate::setup::{open_configured_store, store_settings};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `fabrica doctor` command.
pub async fn run_doctor(config: &FabricaConfig, plain: bool) -> Result<(), FabricaError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config().await,
        check_service("Prompt service", &config.prompt.endpoint).await,
        check_service("Image service", &config.image.endpoint).await,
        check_mesh(config).await,
        check_store(config).await,
    ];

    println!();
    println!("  fabrica doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();

    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red()),
        };
        format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<16} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Check configuration loads without errors.
async fn check_config() -> CheckResult {
    let start = Instant::now();
    match fabrica_config::load_and_validate() {
        Ok(_) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: start.elapsed(),
        },
        Err(errors) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Fail,
            message: format!("{} error(s)", errors.len()),
            duration: start.elapsed(),
        },
    }
}

/// Check a generation service endpoint answers HTTP at all.
async fn check_service(name: &str, endpoint: &str) -> CheckResult {
    let start = Instant::now();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: name.to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    // Any HTTP response counts as reachable; these services 404 on "/".
    match client.head(endpoint).send().await {
        Ok(_) => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Pass,
            message: "reachable".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => {
            let message = if e.is_timeout() {
                "timeout (5s)".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                format!("error: {e}")
            };
            CheckResult {
                name: name.to_string(),
                status: CheckStatus::Fail,
                message,
                duration: start.elapsed(),
            }
        }
    }
}

/// Check the 3D provider has an API key before probing it.
async fn check_mesh(config: &FabricaConfig) -> CheckResult {
    let start = Instant::now();

    if config.mesh.api_key.is_none() {
        return CheckResult {
            name: "3D provider".to_string(),
            status: CheckStatus::Warn,
            message: "no API key configured; 3D generation disabled".to_string(),
            duration: start.elapsed(),
        };
    }

    check_service("3D provider", &config.mesh.endpoint).await
}

/// Check the store is configured and, if so, that listing works.
async fn check_store(config: &FabricaConfig) -> CheckResult {
    let start = Instant::now();

    if store_settings(&config.store).is_none() {
        return CheckResult {
            name: "Artifact store".to_string(),
            status: CheckStatus::Warn,
            message: "not configured; artifacts will not be persisted".to_string(),
            duration: start.elapsed(),
        };
    }

    match open_configured_store(config) {
        Ok(store) => match store.list(fabrica_core::types::keys::METADATA_PREFIX).await {
            Ok(listed) => CheckResult {
                name: "Artifact store".to_string(),
                status: CheckStatus::Pass,
                message: format!("reachable ({} metadata objects)", listed.len()),
                duration: start.elapsed(),
            },
            Err(e) => CheckResult {
                name: "Artifact store".to_string(),
                status: CheckStatus::Fail,
                message: format!("listing failed: {e}"),
                duration: start.elapsed(),
            },
        },
        Err(e) => CheckResult {
            name: "Artifact store".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        },
    }
}
