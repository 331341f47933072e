//! `docent config`: show the effective configuration, or write a starter file.

use std::path::Path;

use anyhow::{bail, Result};
use docent_config::{redact, validate, write_config, DocentConfig};

/// Effective configuration with secrets masked.
pub fn render(config: &DocentConfig) -> Result<serde_json::Value> {
    Ok(redact(&serde_json::to_value(config)?))
}

pub async fn run(config: &DocentConfig, path: &Path, init: bool) -> Result<()> {
    if init {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            bail!("{} already exists", path.display());
        }
        write_config(&DocentConfig::default(), path).await?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&render(config)?)?);

    let report = validate(config);
    for warning in &report.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_masked() {
        let mut config = DocentConfig::default();
        config.chat.openai_api_key = Some("sk-live-secret-value".into());
        let rendered = render(&config).unwrap();
        let shown = rendered["chat"]["openaiApiKey"].as_str().unwrap();
        assert!(!shown.contains("secret-value"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        run(&DocentConfig::default(), &path, true).await.unwrap();
        assert!(path.exists());
        assert!(run(&DocentConfig::default(), &path, true).await.is_err());
    }
}
