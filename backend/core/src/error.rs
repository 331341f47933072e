use thiserror::Error;

/// Top-level error type for the Docent service.
#[derive(Debug, Error)]
pub enum DocentError {
    #[error("LLM provider error ({provider}): {message}")]
    LlmError { provider: String, message: String },

    #[error("embedding backend error: {0}")]
    EmbeddingError(String),

    #[error("text extraction failed for {source_name}: {message}")]
    ExtractionError { source_name: String, message: String },

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocentError {
    /// Wrap a provider failure, keeping the provider name for the caller.
    pub fn llm(provider: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::LlmError {
            provider: provider.into(),
            message: err.to_string(),
        }
    }
}
