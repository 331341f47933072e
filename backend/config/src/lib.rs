//! Docent runtime configuration.
//!
//! Provides:
//! - Typed config schema with built-in defaults
//! - YAML read and atomic write
//! - `${ENV_VAR}` substitution in file values
//! - Environment-variable override layer
//! - Validation report and redaction for display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, default_config_path, load_config_value, write_config};
pub use redact::redact;
pub use schema::{
    ChatConfig, DocentConfig, EmbeddingBackend, EmbeddingConfig, LoggingConfig, OcrConfig, PathsConfig,
    ReviewConfig, ServerConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load the file at `path`, substitute `${VAR}` references, apply
/// environment overrides and log the validation report.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<DocentConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// As [`load_and_prepare`], reading variables from `env`.
pub async fn load_and_prepare_with(path: &Path, env: &HashMap<String, String>) -> Result<DocentConfig> {
    let value = load_config_value(path).await?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: DocentConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at {}", path.display()))?;
    let config = apply_env_overrides(config, env)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
