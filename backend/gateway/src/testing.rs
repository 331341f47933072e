use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use docent_chat::{ChatBackend, ChatOrchestrator, MockProvider};
use docent_core::LlmProvider;
use docent_memory::{EmbeddingProvider, EmbeddingStore, Retriever};
use docent_review::{
    ConversationAnalyzer, IntentAnalyzer, MemorySuggestionLog, ParameterTrustEngine, QuestionLog,
    ReviewHistory, ReviewMode, ReviewProcessor, ReviewService,
};

use crate::server::GatewayState;

/// `[text length, 1.0]`.
pub struct LengthEmbedder;

#[async_trait]
impl EmbeddingProvider for LengthEmbedder {
    fn name(&self) -> &str {
        "length"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0])
    }
}

pub struct Fixture {
    pub state: GatewayState,
    pub chat: Arc<MockProvider>,
    pub classifier: Arc<MockProvider>,
}

pub async fn fixture(dir: &Path, backend: ChatBackend, chat: MockProvider, review: Option<ReviewMode>) -> Fixture {
    let chat = Arc::new(chat);
    let classifier = Arc::new(MockProvider::new("classifier").with_response("find_fee_policy"));

    let store = Arc::new(EmbeddingStore::new(dir.join("embeddings.json")));
    let retriever = Arc::new(Retriever::new(store.clone(), Arc::new(LengthEmbedder)));
    let trust = Arc::new(
        ParameterTrustEngine::open(Arc::new(MemorySuggestionLog::new()), 3)
            .await
            .unwrap(),
    );

    let orchestrator = ChatOrchestrator::new(
        retriever,
        trust.clone(),
        chat.clone() as Arc<dyn LlmProvider>,
        backend,
        "test-model",
    );

    let processor = ReviewProcessor::new(
        ConversationAnalyzer::new(
            IntentAnalyzer::new(classifier.clone() as Arc<dyn LlmProvider>, "classifier-model"),
            QuestionLog::new(dir.join("question_types_log.json")),
            trust.clone(),
        ),
        ReviewHistory::new(dir.join("reviews/history.jsonl")),
    );
    let review = ReviewService::new(
        processor,
        review.is_some(),
        review.unwrap_or_default(),
        4,
    );

    Fixture {
        state: GatewayState {
            orchestrator: Arc::new(orchestrator),
            review: Arc::new(review),
            trust,
            store,
        },
        chat,
        classifier,
    }
}
