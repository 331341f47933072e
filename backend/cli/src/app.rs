//! Builds the runtime components from a [`DocentConfig`].

use std::sync::Arc;

use anyhow::{anyhow, Result};
use docent_chat::{create_provider, ChatBackend, ChatOrchestrator, ProviderSettings};
use docent_config::{DocentConfig, EmbeddingBackend};
use docent_core::LlmProvider;
use docent_gateway::GatewayState;
use docent_memory::{EmbeddingProvider, EmbeddingProviderKind, EmbeddingStore, Retriever};
use docent_review::{
    ConversationAnalyzer, IntentAnalyzer, JsonlSuggestionLog, ParameterTrustEngine, QuestionLog,
    ReviewHistory, ReviewMode, ReviewProcessor, ReviewService,
};
use docent_understanding::{DocumentIngestor, LopdfBackend, TesseractOcr};
use tracing::{error, info};

pub fn chat_backend(config: &DocentConfig) -> ChatBackend {
    ChatBackend::from_use_local(config.chat.use_local_model)
}

pub fn review_mode(config: &DocentConfig) -> Result<ReviewMode> {
    config.review.mode.parse::<ReviewMode>().map_err(|e| anyhow!(e))
}

pub fn embedding_kind(config: &DocentConfig) -> EmbeddingProviderKind {
    match config.embedding.backend {
        EmbeddingBackend::OpenAI => EmbeddingProviderKind::OpenAI {
            api_key: config.chat.api_key().to_string(),
            base_url: config.chat.openai_base_url.clone(),
            model: config.embedding.model.clone(),
        },
        EmbeddingBackend::Ollama => EmbeddingProviderKind::Ollama {
            base_url: config.chat.ollama_url.clone(),
            model: config.embedding.model.clone(),
        },
    }
}

fn provider_settings(config: &DocentConfig) -> ProviderSettings {
    ProviderSettings {
        api_key: config.chat.api_key().to_string(),
        openai_base_url: config.chat.openai_base_url.clone(),
        ollama_url: config.chat.ollama_url.clone(),
    }
}

pub fn build_ingestor(config: &DocentConfig) -> DocumentIngestor {
    let ocr = TesseractOcr::new()
        .with_binary(config.ocr.tesseract_bin.clone())
        .with_language(config.ocr.language.clone());
    let pdf = LopdfBackend::new()
        .with_pdftoppm(config.ocr.pdftoppm_bin.clone())
        .with_dpi(config.ocr.dpi);
    DocumentIngestor::new(Arc::new(ocr), Arc::new(pdf)).with_chunk_size(config.embedding.chunk_size)
}

/// Everything `serve` needs, plus the pieces used to fill the store.
pub struct Runtime {
    pub state: GatewayState,
    pub ingestor: Arc<DocumentIngestor>,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

/// Wire every component. Must run inside a Tokio runtime; background
/// review mode spawns its worker here.
pub async fn build_runtime(config: &DocentConfig) -> Result<Runtime> {
    let backend = chat_backend(config);
    let mode = review_mode(config)?;
    let settings = provider_settings(config);

    let embedder = docent_memory::create_provider(embedding_kind(config));
    let store = Arc::new(EmbeddingStore::new(config.paths.embeddings_file()));
    let retriever = Arc::new(
        Retriever::new(store.clone(), embedder.clone()).with_top_k(config.embedding.top_k),
    );

    let suggestions = Arc::new(JsonlSuggestionLog::new(config.paths.suggestion_log()));
    let trust = Arc::new(ParameterTrustEngine::open(suggestions, config.review.trust_threshold).await?);

    let chat_provider = create_provider(backend, &settings);
    let orchestrator = ChatOrchestrator::new(
        retriever,
        trust.clone(),
        chat_provider,
        backend,
        config.chat.active_model(),
    );

    // Classification always goes to the hosted API.
    let classifier: Arc<dyn LlmProvider> = create_provider(ChatBackend::Hosted, &settings);
    let processor = ReviewProcessor::new(
        ConversationAnalyzer::new(
            IntentAnalyzer::new(classifier, config.review.classifier_model.clone()),
            QuestionLog::new(config.paths.question_log()),
            trust.clone(),
        ),
        ReviewHistory::new(config.paths.review_history()),
    );
    let review = ReviewService::new(processor, config.review.enabled, mode, config.review.queue_capacity);

    info!(
        backend = %backend,
        model = %config.chat.active_model(),
        embedder = embedder.name(),
        review = config.review.enabled,
        "Runtime wired"
    );

    Ok(Runtime {
        state: GatewayState {
            orchestrator: Arc::new(orchestrator),
            review: Arc::new(review),
            trust,
            store,
        },
        ingestor: Arc::new(build_ingestor(config)),
        embedder,
    })
}

/// Load (or build) the embeddings store without holding up the server.
pub fn spawn_store_load(runtime: &Runtime, config: &DocentConfig) {
    let store = runtime.state.store.clone();
    let ingestor = runtime.ingestor.clone();
    let embedder = runtime.embedder.clone();
    let source_dir = config.paths.source_dir.clone();

    tokio::spawn(async move {
        match store.load(&ingestor, &source_dir, embedder.as_ref()).await {
            Ok(count) => info!(records = count, "Knowledge base ready"),
            Err(e) => error!(
                source = %source_dir.display(),
                error = %e,
                "Knowledge base unavailable; answering without context"
            ),
        }
    });
}
