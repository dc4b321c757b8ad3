// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fabrica - multi-stage AI asset generation with object-store persistence.
//!
//! This is the binary entry point for the Fabrica CLI.

mod browse;
mod doctor;
mod generate;
mod setup;

use clap::{Parser, Subcommand};

/// Fabrica - generate images and 3D models from text prompts.
#[derive(Parser, Debug)]
#[command(name = "fabrica", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new asset from a text prompt.
    Generate {
        /// Asset description prompt, e.g. "futuristic laser sword".
        #[arg(long)]
        prompt: String,

        /// Output kind: "image" or "3d-model".
        #[arg(long, default_value = "image")]
        output: String,

        /// Existing image URL to feed the 3D stage instead of generating
        /// an intermediate image.
        #[arg(long)]
        image_ref: Option<String>,
    },
    /// List persisted artifacts from the store.
    Browse {
        /// Artifact kind: "metadata", "images", or "models".
        #[arg(long, default_value = "metadata")]
        kind: String,
    },
    /// Show one metadata document and mint URLs for its linked artifacts.
    Show {
        /// Metadata object key, e.g. "metadata/<asset-id>.json".
        #[arg(long)]
        key: String,
    },
    /// Run environment diagnostic checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match fabrica_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            fabrica_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Generate {
            prompt,
            output,
            image_ref,
        }) => generate::run(&config, &prompt, &output, image_ref).await,
        Some(Commands::Browse { kind }) => browse::run_browse(&config, &kind).await,
        Some(Commands::Show { key }) => browse::run_show(&config, &key).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("fabrica: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fabrica={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
