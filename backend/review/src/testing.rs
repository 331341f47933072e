//! Scripted completion backend for tests.

use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use docent_core::{LlmProvider, LlmRequest, LlmResponse};
use tokio::sync::Mutex;

/// Returns queued replies in order; fails once the queue is empty or when
/// built with [`ScriptedProvider::failing`].
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    pub fn replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::replies(&[])
    }

    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().await.push(request.clone());
        let content = self
            .replies
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("backend unavailable"))?;
        Ok(LlmResponse {
            content,
            provider: "scripted".into(),
            model: request.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
