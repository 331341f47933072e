//! Conversation review: question logging, intent analysis and the
//! parameter trust engine that promotes recurring intents.

pub mod analyzer;
pub mod history;
pub mod intent;
pub mod question_log;
pub mod service;
pub mod suggestion_log;
pub mod trust;
pub mod worker;

#[cfg(test)]
mod testing;

pub use analyzer::{ConversationAnalyzer, Pathway, INTENT_PARAMETER};
pub use history::{ReviewEntry, ReviewHistory};
pub use intent::{IntentAnalyzer, UNKNOWN_INTENT};
pub use question_log::{QuestionEntry, QuestionLog};
pub use service::{ReviewMode, ReviewOutcome, ReviewProcessor, ReviewRequest, ReviewService, DEFAULT_QUEUE_CAPACITY};
pub use suggestion_log::{JsonlSuggestionLog, MemorySuggestionLog, SuggestionLog};
pub use trust::{ConflictAction, ParameterTrustEngine, SuggestionOutcome, DEFAULT_TRUST_THRESHOLD};
pub use worker::{spawn_worker, ReviewQueue};
