pub mod mock;
pub mod ollama;
pub mod openai;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use docent_core::LlmProvider;
use serde::{Deserialize, Serialize};

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Which completion backend answers chat requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatBackend {
    /// Hosted OpenAI-compatible API.
    #[default]
    Hosted,
    /// Local Ollama server.
    Local,
}

impl ChatBackend {
    /// `USE_LOCAL_MODEL=true` selects the local backend.
    pub fn from_use_local(use_local: bool) -> Self {
        if use_local {
            ChatBackend::Local
        } else {
            ChatBackend::Hosted
        }
    }
}

impl FromStr for ChatBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosted" | "openai" => Ok(ChatBackend::Hosted),
            "local" | "ollama" => Ok(ChatBackend::Local),
            other => Err(format!("unknown chat backend '{}'", other)),
        }
    }
}

impl fmt::Display for ChatBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatBackend::Hosted => write!(f, "hosted"),
            ChatBackend::Local => write!(f, "local"),
        }
    }
}

/// Connection settings for the completion backends.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub openai_base_url: Option<String>,
    pub ollama_url: String,
}

pub fn create_provider(backend: ChatBackend, settings: &ProviderSettings) -> Arc<dyn LlmProvider> {
    match backend {
        ChatBackend::Hosted => {
            let provider = OpenAiProvider::new(settings.api_key.clone());
            match &settings.openai_base_url {
                Some(url) => Arc::new(provider.with_base_url(url.clone())),
                None => Arc::new(provider),
            }
        }
        ChatBackend::Local => Arc::new(OllamaProvider::new().with_base_url(settings.ollama_url.clone())),
    }
}
