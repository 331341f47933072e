/// Embedding providers for Docent.
///
/// Supports: OpenAI (and compatible endpoints), Ollama.
/// All providers implement the `EmbeddingProvider` trait.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;
    /// Embed a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    /// Embed a batch of texts (default: sequential).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

pub struct OpenAIEmbeddings {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAIEmbeddings {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: "https://api.openai.com/v1".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct OpenAIEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAIEmbedResponse {
    data: Vec<OpenAIEmbedData>,
}

#[derive(Deserialize)]
struct OpenAIEmbedData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIEmbeddings {
    async fn request(&self, input: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let expected = input.len();
        let body = OpenAIEmbedRequest { model: &self.model, input };
        let res: OpenAIEmbedResponse = self.client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut data = res.data;
        data.sort_by_key(|d| d.index);
        if data.len() != expected {
            anyhow::bail!("OpenAI returned {} embeddings for {} inputs", data.len(), expected);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn name(&self) -> &str { "openai" }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(vec![text]).await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty OpenAI embedding response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts.to_vec()).await
    }
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

pub struct OllamaEmbeddings {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaEmbeddings {
    pub fn new(base_url: String, model: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn name(&self) -> &str { "ollama" }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text]).await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embeddings array from Ollama"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = OllamaEmbedRequest { model: &self.model, input: texts.to_vec() };
        let response = self.client
            .post(format!("{}/api/embed", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "Ollama API error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }
        let res: OllamaEmbedResponse = response.json().await?;
        if res.embeddings.len() != texts.len() {
            anyhow::bail!("Ollama returned {} embeddings for {} inputs", res.embeddings.len(), texts.len());
        }
        Ok(res.embeddings)
    }
}

// ---------------------------------------------------------------------------
// Factory from config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum EmbeddingProviderKind {
    OpenAI { api_key: String, base_url: Option<String>, model: Option<String> },
    Ollama { base_url: String, model: Option<String> },
}

pub fn create_provider(kind: EmbeddingProviderKind) -> Arc<dyn EmbeddingProvider> {
    match kind {
        EmbeddingProviderKind::OpenAI { api_key, base_url, model } => {
            let provider = OpenAIEmbeddings::new(api_key, model);
            match base_url {
                Some(url) => Arc::new(provider.with_base_url(url)),
                None => Arc::new(provider),
            }
        }
        EmbeddingProviderKind::Ollama { base_url, model } => Arc::new(OllamaEmbeddings::new(base_url, model)),
    }
}
