//! Config validation with field paths in every message.

use crate::schema::DocentConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &DocentConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_chat(config, &mut report);
    validate_embedding(config, &mut report);
    validate_review(config, &mut report);
    report
}

fn validate_server(config: &DocentConfig, report: &mut ValidationReport) {
    let port = config.server.port;
    if port == 0 {
        report.error("server.port", "port must be > 0");
    } else if port < 1024 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

fn validate_chat(config: &DocentConfig, report: &mut ValidationReport) {
    let chat = &config.chat;
    if !chat.use_local_model && chat.api_key().trim().is_empty() {
        report.error("chat.openaiApiKey", "OPENAI_API_KEY is required for the hosted backend");
    }
    if chat.active_model().trim().is_empty() {
        report.error("chat.model", "Model name cannot be empty");
    }
    if chat.use_local_model && chat.ollama_url.trim().is_empty() {
        report.error("chat.ollamaUrl", "OLLAMA_URL is required for the local backend");
    }
}

fn validate_embedding(config: &DocentConfig, report: &mut ValidationReport) {
    let emb = &config.embedding;
    if emb.chunk_size == 0 {
        report.error("embedding.chunkSize", "chunkSize must be >= 1");
    }
    if emb.top_k == 0 {
        report.warn("embedding.topK", "topK is 0; chat requests will have no context");
    }
    if emb.backend == crate::schema::EmbeddingBackend::OpenAI && config.chat.api_key().trim().is_empty() {
        report.error("embedding.backend", "OpenAI embeddings need OPENAI_API_KEY");
    }
}

fn validate_review(config: &DocentConfig, report: &mut ValidationReport) {
    let review = &config.review;
    if review.trust_threshold == 0 {
        report.error("review.trustThreshold", "trustThreshold must be >= 1");
    }
    if !matches!(review.mode.as_str(), "background" | "inline") {
        report.error(
            "review.mode",
            format!("Unknown review mode '{}'; expected background or inline", review.mode),
        );
    }
    if review.enabled && review.queue_capacity == 0 {
        report.warn("review.queueCapacity", "queueCapacity 0 is raised to 1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosted_config() -> DocentConfig {
        let mut config = DocentConfig::default();
        config.chat.openai_api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn default_hosted_config_with_key_is_valid() {
        let report = validate(&hosted_config());
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn hosted_backend_without_key_is_an_error() {
        let report = validate(&DocentConfig::default());
        assert!(report.errors.iter().any(|e| e.path == "chat.openaiApiKey"));
    }

    #[test]
    fn local_backend_needs_no_key() {
        let mut config = DocentConfig::default();
        config.chat.use_local_model = true;
        config.embedding.backend = crate::schema::EmbeddingBackend::Ollama;
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn zero_threshold_and_chunk_size_are_errors() {
        let mut config = hosted_config();
        config.review.trust_threshold = 0;
        config.embedding.chunk_size = 0;
        config.review.mode = "sync".into();
        let paths: Vec<String> = validate(&config).errors.into_iter().map(|e| e.path).collect();
        assert!(paths.contains(&"review.trustThreshold".to_string()));
        assert!(paths.contains(&"embedding.chunkSize".to_string()));
        assert!(paths.contains(&"review.mode".to_string()));
    }
}
