use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docent_core::{ChatMessage, LlmProvider, LlmRequest, LlmResponse};

/// Local Ollama server, consumed through its streaming `/api/chat` endpoint.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    message: Option<OllamaChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    eval_count: Option<u64>,
    prompt_eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}

/// Reassembles newline-delimited JSON fragments that may be split across
/// network reads.
#[derive(Default)]
pub(crate) struct StreamAccumulator {
    pending: Vec<u8>,
    content: String,
    tokens_used: u64,
    done: bool,
}

impl StreamAccumulator {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.consume_line(&line)?;
        }
        Ok(())
    }

    /// Flush a trailing fragment that had no newline and return the reply.
    pub(crate) fn finish(mut self) -> Result<(String, u64)> {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&rest)?;
        if !self.done {
            warn!("Ollama stream ended without a done marker");
        }
        Ok((self.content, self.tokens_used))
    }

    fn consume_line(&mut self, line: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(line).context("Ollama stream was not UTF-8")?.trim();
        if text.is_empty() {
            return Ok(());
        }
        let chunk: OllamaChunk =
            serde_json::from_str(text).with_context(|| format!("Bad Ollama stream fragment: {}", text))?;
        if let Some(error) = chunk.error {
            anyhow::bail!("Ollama stream error: {}", error);
        }
        if let Some(message) = chunk.message {
            self.content.push_str(&message.content);
        }
        if chunk.done {
            self.done = true;
            self.tokens_used = chunk.eval_count.unwrap_or(0) + chunk.prompt_eval_count.unwrap_or(0);
        }
        Ok(())
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();

        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };
        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            options,
        };

        debug!(model = %request.model, "Sending streaming request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Ollama HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {}: {}", status, error_body);
        }

        let mut accumulator = StreamAccumulator::default();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Ollama stream interrupted")?;
            accumulator.push(&chunk)?;
        }
        let (content, tokens_used) = accumulator.finish()?;

        Ok(LlmResponse {
            content,
            provider: "ollama".to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
