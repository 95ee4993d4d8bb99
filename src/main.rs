//! CLI entry point for the VOE client.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use voe_core::{ClientConfig, VoeClient};

mod app_config;
mod cli;
mod commands;

use app_config::{FileConfig, VerbositySetting, load_file_config};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded = load_file_config(cli.config.as_deref())?;
    init_tracing(&cli, loaded.config.as_ref());
    debug!(
        path = ?loaded.path,
        from_file = loaded.loaded_from_file,
        "configuration resolved"
    );

    let config = client_config(&cli, loaded.config.as_ref())?;
    let client = VoeClient::new(config).context("Failed to create API client")?;

    let output = commands::run_api_command(&client, &loaded, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
///
/// Priority: `RUST_LOG` env var > -q/-v flags > config file verbosity >
/// default (warn).
fn init_tracing(cli: &Cli, file_config: Option<&FileConfig>) {
    let verbosity = if cli.quiet {
        Some(VerbositySetting::Quiet)
    } else if cli.verbose > 0 {
        None
    } else {
        file_config.and_then(|c| c.verbosity)
    };

    let default_level = match verbosity {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Default) => "warn",
        None => match cli.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        },
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merges flags over file values and validates the result.
fn client_config(cli: &Cli, file_config: Option<&FileConfig>) -> Result<ClientConfig> {
    let file = file_config.cloned().unwrap_or_default();

    let api_key = cli.api_key.clone().or(file.api_key).unwrap_or_default();
    let mut builder = ClientConfig::builder(api_key);
    if let Some(base_url) = cli.base_url.clone().or(file.base_url) {
        builder = builder.base_url(base_url);
    }
    if let Some(timeout_ms) = cli.timeout_ms.or(file.timeout_ms) {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(attempts) = cli.retries.or(file.retry_attempts) {
        builder = builder.retry_attempts(attempts);
    }
    if let Some(delay_ms) = cli.retry_delay_ms.or(file.retry_delay_ms) {
        builder = builder.retry_delay(Duration::from_millis(delay_ms));
    }

    builder.build().context(
        "Invalid client configuration (set --api-key, VOE_API_KEY or api_key in the config file)",
    )
}
