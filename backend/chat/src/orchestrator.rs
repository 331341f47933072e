//! Per-request chat flow: retrieve, bias by trusted intent, complete.

use std::sync::Arc;

use docent_core::{ChatMessage, DocentError, LlmProvider, LlmRequest, Role};
use docent_memory::Retriever;
use docent_review::{ParameterTrustEngine, INTENT_PARAMETER};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::prompt::{compose_system_prompt, DEFAULT_INTENT};
use crate::providers::ChatBackend;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatReply {
    pub reply: String,
    pub intent: String,
    pub context_chunks: usize,
    pub provider: String,
    pub latency_ms: u64,
}

pub struct ChatOrchestrator {
    retriever: Arc<Retriever>,
    trust: Arc<ParameterTrustEngine>,
    provider: Arc<dyn LlmProvider>,
    backend: ChatBackend,
    model: String,
}

impl ChatOrchestrator {
    pub fn new(
        retriever: Arc<Retriever>,
        trust: Arc<ParameterTrustEngine>,
        provider: Arc<dyn LlmProvider>,
        backend: ChatBackend,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            trust,
            provider,
            backend,
            model: model.into(),
        }
    }

    pub fn backend(&self) -> ChatBackend {
        self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer the latest user message in `history`.
    ///
    /// Retrieval problems degrade to an empty context; only the completion
    /// call can fail.
    pub async fn respond(&self, history: Vec<ChatMessage>) -> Result<ChatReply, DocentError> {
        let query = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let context = if query.trim().is_empty() {
            Vec::new()
        } else {
            match self.retriever.retrieve(&query).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!(error = %e, "Retrieval failed, answering without context");
                    Vec::new()
                }
            }
        };

        let intent = self
            .trust
            .trusted_value(INTENT_PARAMETER)
            .await
            .unwrap_or_else(|| DEFAULT_INTENT.to_string());

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(compose_system_prompt(&intent, &context)));
        messages.extend(history);

        debug!(
            intent = %intent,
            context_chunks = context.len(),
            messages = messages.len(),
            "Dispatching chat request"
        );

        let request = LlmRequest::new(self.model.clone(), messages);
        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| DocentError::llm(self.provider.name(), format!("{:#}", e)))?;

        info!(
            provider = %response.provider,
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.tokens_used,
            "Chat reply ready"
        );

        Ok(ChatReply {
            reply: response.content,
            intent,
            context_chunks: context.len(),
            provider: response.provider,
            latency_ms: response.latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;
    use anyhow::Result;
    use async_trait::async_trait;
    use docent_core::EmbeddingRecord;
    use docent_memory::{EmbeddingProvider, EmbeddingStore};
    use docent_review::MemorySuggestionLog;

    /// `[count("fee"), count("rate")]`.
    struct KeywordEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.fail {
                anyhow::bail!("embedding backend down");
            }
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("fee").count() as f32,
                lower.matches("rate").count() as f32,
            ])
        }
    }

    async fn orchestrator(
        provider: Arc<MockProvider>,
        embed_fails: bool,
        trusted_intent: Option<&str>,
    ) -> ChatOrchestrator {
        let store = Arc::new(EmbeddingStore::new("unused.json"));
        store
            .replace(vec![
                EmbeddingRecord {
                    source: "fees.pdf".into(),
                    text: "Wire fee is $25.".into(),
                    embedding: vec![1.0, 0.0],
                },
                EmbeddingRecord {
                    source: "rates.png".into(),
                    text: "Savings rate 4.1%.".into(),
                    embedding: vec![0.0, 1.0],
                },
            ])
            .await;
        let retriever = Retriever::new(store, Arc::new(KeywordEmbedder { fail: embed_fails })).with_top_k(1);

        let trust = ParameterTrustEngine::open(Arc::new(MemorySuggestionLog::new()), 1)
            .await
            .unwrap();
        if let Some(intent) = trusted_intent {
            trust.suggest(INTENT_PARAMETER, intent).await.unwrap();
        }

        ChatOrchestrator::new(Arc::new(retriever), Arc::new(trust), provider, ChatBackend::Hosted, "gpt-3.5-turbo")
    }

    #[tokio::test]
    async fn test_system_prompt_carries_context_and_intent() {
        let provider = Arc::new(MockProvider::new("mock").with_response("It costs $25."));
        let chat = orchestrator(provider.clone(), false, Some("find_fee_policy")).await;

        let reply = chat
            .respond(vec![ChatMessage::user("What is the wire fee?")])
            .await
            .unwrap();
        assert_eq!(reply.reply, "It costs $25.");
        assert_eq!(reply.intent, "find_fee_policy");
        assert_eq!(reply.context_chunks, 1);

        let request = provider.last_request().await.unwrap();
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(
            request.messages[0].content,
            compose_system_prompt("find_fee_policy", &["Wire fee is $25.".to_string()])
        );
        assert_eq!(request.messages[1], ChatMessage::user("What is the wire fee?"));
    }

    #[tokio::test]
    async fn test_default_intent_without_trusted_value() {
        let provider = Arc::new(MockProvider::new("mock"));
        let chat = orchestrator(provider, false, None).await;
        let reply = chat.respond(vec![ChatMessage::user("rate?")]).await.unwrap();
        assert_eq!(reply.intent, DEFAULT_INTENT);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_empty_context() {
        let provider = Arc::new(MockProvider::new("mock"));
        let chat = orchestrator(provider.clone(), true, None).await;

        let reply = chat.respond(vec![ChatMessage::user("fee?")]).await.unwrap();
        assert_eq!(reply.context_chunks, 0);
        let request = provider.last_request().await.unwrap();
        assert!(request.messages[0].content.ends_with("Answer using only the following knowledge:\n"));
    }

    #[tokio::test]
    async fn test_history_is_forwarded_after_system_message() {
        let provider = Arc::new(MockProvider::new("mock"));
        let chat = orchestrator(provider.clone(), false, None).await;

        let history = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("What about rates?"),
        ];
        chat.respond(history.clone()).await.unwrap();

        let request = provider.last_request().await.unwrap();
        assert_eq!(&request.messages[1..], &history[..]);
        assert!(request.messages[0].content.ends_with("Savings rate 4.1%."));
    }

    #[tokio::test]
    async fn test_backend_failure_is_llm_error() {
        let provider = Arc::new(MockProvider::new("ollama").failing());
        let chat = orchestrator(provider, false, None).await;

        let err = chat.respond(vec![ChatMessage::user("fee?")]).await.unwrap_err();
        match err {
            DocentError::LlmError { provider, .. } => assert_eq!(provider, "ollama"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
