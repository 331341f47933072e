//! Docent runtime configuration schema.
//!
//! Every section has serde defaults, so a partial YAML file (or none at all)
//! yields a complete config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocentConfig {
    /// HTTP listener
    pub server: ServerConfig,

    /// Where artifacts are read from and state is written to
    pub paths: PathsConfig,

    /// Completion backends
    pub chat: ChatConfig,

    /// Embedding backend, chunking and retrieval
    pub embedding: EmbeddingConfig,

    /// Conversation review and parameter trust
    pub review: ReviewConfig,

    /// OCR / PDF tooling
    pub ocr: OcrConfig,

    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::DEFAULT_BIND.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PathsConfig {
    /// Directory of source artifacts (images, PDFs, text).
    pub source_dir: PathBuf,
    /// Embeddings store, suggestion log, question log, review history.
    pub data_dir: PathBuf,
    /// Rolling JSON log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(defaults::DEFAULT_SOURCE_DIR),
            data_dir: PathBuf::from(defaults::DEFAULT_DATA_DIR),
            log_dir: None,
        }
    }
}

impl PathsConfig {
    pub fn embeddings_file(&self) -> PathBuf {
        self.data_dir.join(defaults::EMBEDDINGS_FILE)
    }

    pub fn suggestion_log(&self) -> PathBuf {
        self.data_dir.join(defaults::SUGGESTION_LOG_FILE)
    }

    pub fn question_log(&self) -> PathBuf {
        self.data_dir.join(defaults::QUESTION_LOG_FILE)
    }

    pub fn review_history(&self) -> PathBuf {
        self.data_dir.join(defaults::REVIEW_HISTORY_FILE)
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Use the local Ollama server instead of the hosted API.
    pub use_local_model: bool,
    /// Hosted chat model.
    pub model: String,
    /// Local chat model.
    pub local_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    pub ollama_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            use_local_model: false,
            model: defaults::DEFAULT_CHAT_MODEL.to_string(),
            local_model: defaults::DEFAULT_LOCAL_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: defaults::DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

impl ChatConfig {
    /// Model name for whichever backend is active.
    pub fn active_model(&self) -> &str {
        if self.use_local_model {
            &self.local_model
        } else {
            &self.model
        }
    }

    pub fn api_key(&self) -> &str {
        self.openai_api_key.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    OpenAI,
    Ollama,
}

impl std::str::FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(EmbeddingBackend::OpenAI),
            "ollama" => Ok(EmbeddingBackend::Ollama),
            other => Err(format!("unknown embedding backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Backend default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Chunks retrieved per chat request.
    pub top_k: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAI,
            model: None,
            chunk_size: defaults::DEFAULT_CHUNK_SIZE,
            top_k: defaults::DEFAULT_TOP_K,
        }
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewConfig {
    pub enabled: bool,
    /// `background` or `inline`.
    pub mode: String,
    pub classifier_model: String,
    pub trust_threshold: u32,
    pub queue_capacity: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: defaults::DEFAULT_REVIEW_MODE.to_string(),
            classifier_model: defaults::DEFAULT_CLASSIFIER_MODEL.to_string(),
            trust_threshold: defaults::DEFAULT_TRUST_THRESHOLD,
            queue_capacity: defaults::DEFAULT_REVIEW_QUEUE,
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    pub tesseract_bin: String,
    pub pdftoppm_bin: String,
    pub language: String,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_bin: "tesseract".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            language: defaults::DEFAULT_OCR_LANGUAGE.to_string(),
            dpi: defaults::DEFAULT_RASTER_DPI,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "server:\n  port: 9000\nchat:\n  useLocalModel: true\n";
        let config: DocentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, defaults::DEFAULT_BIND);
        assert!(config.chat.use_local_model);
        assert_eq!(config.chat.active_model(), defaults::DEFAULT_LOCAL_MODEL);
        assert_eq!(config.review.trust_threshold, 3);
    }

    #[test]
    fn data_files_live_under_data_dir() {
        let paths = PathsConfig {
            data_dir: PathBuf::from("/var/docent"),
            ..PathsConfig::default()
        };
        assert_eq!(paths.suggestion_log(), PathBuf::from("/var/docent/analyzer_output.txt"));
        assert_eq!(paths.review_history(), PathBuf::from("/var/docent/reviews/history.jsonl"));
    }
}
