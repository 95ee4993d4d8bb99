//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// TOML-backed file configuration for client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// API key used when neither `--api-key` nor `VOE_API_KEY` is set.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Attempts per request, including the first.
    pub retry_attempts: Option<u32>,
    /// Base retry delay in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against the same ranges the CLI accepts.
    pub fn validate(&self) -> Result<()> {
        validate_range("timeout_ms", self.timeout_ms, 1..=600_000)?;
        validate_range("retry_attempts", self.retry_attempts.map(u64::from), 1..=10)?;
        validate_range("retry_delay_ms", self.retry_delay_ms, 1..=60_000)?;
        if let Some(api_key) = &self.api_key
            && api_key.trim().is_empty()
        {
            bail!("Invalid config value for `api_key`: must not be empty");
        }
        Ok(())
    }
}

fn validate_range(
    field: &str,
    value: Option<u64>,
    range: std::ops::RangeInclusive<u64>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !range.contains(&value) {
        bail!(
            "Invalid config value for `{field}`: {value}. Expected range: {}..={}",
            range.start(),
            range.end()
        );
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/voe/config.toml`
/// 2. `$HOME/.config/voe/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("voe").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("voe")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` when given, otherwise from the default path
/// if a file exists there.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_file_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = read_file_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config: Some(config),
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        }),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_parse_config_all_fields() {
        let config = parse_config_str(
            r#"
            # account
            api_key = "abc"
            base_url = "http://localhost:9000/api"
            timeout_ms = 5000
            retry_attempts = 4
            retry_delay_ms = 200
            verbosity = "quiet"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/api"));
        assert_eq!(config.timeout_ms, Some(5000));
        assert_eq!(config.retry_attempts, Some(4));
        assert_eq!(config.retry_delay_ms, Some(200));
        assert_eq!(config.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        assert_eq!(parse_config_str("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_config_unknown_key_rejected() {
        assert!(parse_config_str("concurrency = 4").is_err());
    }

    #[test]
    fn test_parse_config_out_of_range_rejected() {
        let err = parse_config_str("retry_attempts = 0").unwrap_err();
        assert!(err.to_string().contains("retry_attempts"));
        assert!(parse_config_str("timeout_ms = 0").is_err());
    }

    #[test]
    fn test_parse_config_blank_api_key_rejected() {
        assert!(parse_config_str("api_key = \"  \"").is_err());
    }

    #[test]
    fn test_parse_config_bad_verbosity_rejected() {
        assert!(parse_config_str("verbosity = \"loud\"").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("voe.toml");
        fs::write(&path, "api_key = \"from-file\"\n").unwrap();

        let loaded = load_file_config(Some(&path)).unwrap();
        assert!(loaded.loaded_from_file);
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(
            loaded.config.unwrap().api_key.as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_load_explicit_missing_path_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_verbosity_labels() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Verbose.as_str(), "verbose");
        assert_eq!(VerbositySetting::Quiet.as_str(), "quiet");
    }
}
