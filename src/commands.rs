//! CLI command handlers: one API call per subcommand, rendered as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;
use voe_core::api::types::PremiumKeyParams;
use voe_core::{ClientConfig, VoeClient};

use crate::app_config::{LoadedConfig, VerbositySetting};
use crate::cli::Command;

/// Runs `command` against the API and returns the JSON to print.
pub async fn run_api_command(
    client: &VoeClient,
    loaded: &LoadedConfig,
    command: Command,
) -> Result<Value> {
    match command {
        Command::AccountInfo => render(client.account_info().await?),
        Command::AccountStats => render(client.account_stats().await?),
        Command::UploadServer => render(client.upload_server().await?),
        Command::Upload { path, name } => {
            let file_name = upload_name(&path, name)?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            info!(file = %file_name, bytes = bytes.len(), "uploading");
            render(client.upload_file(&file_name, bytes).await?)
        }
        Command::RemoteUpload { url, folder } => {
            render(client.add_remote_upload(&url, folder).await?)
        }
        Command::RemoteUploads => render(client.remote_upload_list().await?),
        Command::Clone { file_code, folder } => {
            render(client.clone_file(&file_code, folder).await?)
        }
        Command::Info { file_codes } => render(client.file_info(file_codes.as_slice()).await?),
        Command::List(args) => render(client.file_list(&args.to_params()).await?),
        Command::Rename { file_code, title } => {
            client.rename_file(&file_code, &title).await?;
            Ok(done())
        }
        Command::Move {
            file_code,
            folder_id,
        } => {
            client.move_file_to_folder(&file_code, folder_id).await?;
            Ok(done())
        }
        Command::Delete { file_codes } => {
            client.delete_files(file_codes.as_slice()).await?;
            Ok(done())
        }
        Command::Folders { folder } => render(client.folder_list(folder).await?),
        Command::CreateFolder { name, parent } => {
            let fld_id = client.create_folder(&name, parent).await?;
            Ok(json!({ "fld_id": fld_id }))
        }
        Command::RenameFolder { folder_id, name } => {
            client.rename_folder(folder_id, &name).await?;
            Ok(done())
        }
        Command::Deleted(args) => render(client.deleted_files(&args.to_params()).await?),
        Command::Dmca(args) => render(client.dmca_list(&args.to_params()).await?),
        Command::Domain => render(client.current_domain().await?),
        Command::PremiumKeys { days, amount } => render(
            client
                .generate_premium_keys(PremiumKeyParams { days, amount })
                .await?,
        ),
        Command::Config => Ok(config_summary(client.config(), loaded)),
    }
}

/// Describes the effective configuration with the API key redacted.
pub fn config_summary(config: &ClientConfig, loaded: &LoadedConfig) -> Value {
    json!({
        "config_path": loaded
            .path
            .as_ref()
            .map_or_else(|| "<unresolved>".to_string(), |path| path.display().to_string()),
        "config_file": if loaded.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        },
        "api_key": "<redacted>",
        "verbosity": loaded
            .config
            .as_ref()
            .and_then(|c| c.verbosity)
            .map_or("default", VerbositySetting::as_str),
        "base_url": config.base_url(),
        "timeout_ms": config.timeout().as_millis(),
        "retry_attempts": config.retry_attempts(),
        "retry_delay_ms": config.retry_delay().as_millis(),
        "rate_limit": {
            "requests_per_second": config.rate_limit().requests_per_second,
            "max_requests": config.rate_limit().max_requests,
            "time_window_ms": config.rate_limit().time_window.as_millis(),
        },
    })
}

fn render<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to render response")
}

fn done() -> Value {
    json!({ "success": true })
}

fn upload_name(path: &Path, name: Option<String>) -> Result<String> {
    if let Some(name) = name {
        return Ok(name);
    }
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot derive a file name from '{}'", path.display()))
}
