//! Config file location, reading and atomic writing.

use crate::schema::DocentConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Docent config directory.
/// Priority: `DOCENT_CONFIG_DIR` env > `~/.docent/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCENT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".docent"),
        None => PathBuf::from(".docent"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// `$DOCENT_CONFIG` if set, else `<config_dir>/config.yaml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var("DOCENT_CONFIG") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => config_file_path(&config_dir()),
    }
}

/// Read the config file as an untyped JSON tree, ready for `${VAR}`
/// substitution. A missing file reads as an empty object.
pub async fn load_config_value(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let yaml: serde_yaml::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;
    let value = match serde_json::to_value(yaml)
        .with_context(|| format!("Config at {} is not representable as JSON", path.display()))?
    {
        // An empty file parses as null.
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Write config to disk atomically (write to temp file, rename), keeping
/// the previous file as `config.yaml.bak`.
pub async fn write_config(config: &DocentConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if fs::try_exists(path).await.unwrap_or(false) {
        let bak = path.with_extension("yaml.bak");
        if let Err(e) = fs::copy(path, &bak).await {
            warn!("Failed to create backup {}: {}", bak.display(), e);
        }
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_config_value(&dir.path().join("config.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.yaml");

        let mut config = DocentConfig::default();
        config.server.port = 7000;
        write_config(&config, &path).await.unwrap();
        write_config(&config, &path).await.unwrap();
        assert!(path.with_extension("yaml.bak").exists());

        let value = load_config_value(&path).await.unwrap();
        assert_eq!(value["server"]["port"], 7000);
        let parsed: DocentConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server: [unterminated").unwrap();
        assert!(load_config_value(&path).await.is_err());
    }
}
