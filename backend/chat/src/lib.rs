//! Retrieval-augmented chat: completion backends and the orchestrator that
//! composes each request.

pub mod orchestrator;
pub mod prompt;
pub mod providers;

pub use orchestrator::{ChatOrchestrator, ChatReply};
pub use prompt::{compose_system_prompt, intent_fragment, DEFAULT_INTENT};
pub use providers::{create_provider, ChatBackend, MockProvider, OllamaProvider, OpenAiProvider, ProviderSettings};
