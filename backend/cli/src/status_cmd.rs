//! `docent status`: ask a running server for its health report.

use anyhow::Result;
use docent_config::DocentConfig;

/// Wildcard binds are reached through loopback.
pub fn health_url(config: &DocentConfig) -> String {
    let host = match config.server.bind.as_str() {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    };
    format!("http://{}:{}/api/health", host, config.server.port)
}

pub async fn run(config: &DocentConfig) -> Result<()> {
    let url = health_url(config);
    let client = reqwest::Client::new();
    match client.get(&url).send().await {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            println!("Docent is not running at {}", url);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url() {
        let mut config = DocentConfig::default();
        config.server.port = 5050;
        assert_eq!(health_url(&config), "http://127.0.0.1:5050/api/health");

        config.server.bind = "0.0.0.0".into();
        assert_eq!(health_url(&config), "http://127.0.0.1:5050/api/health");

        config.server.bind = "10.0.0.7".into();
        assert_eq!(health_url(&config), "http://10.0.0.7:5050/api/health");
    }
}
