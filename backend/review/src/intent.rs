//! LLM-backed conversation classification.

use std::sync::Arc;

use docent_core::{user_turns, ChatMessage, LlmProvider, LlmRequest};
use tracing::{debug, warn};

/// Label used when the intent cannot be determined.
pub const UNKNOWN_INTENT: &str = "unknown_intent";

const FILTER_PROMPT: &str = "You are a filter. Determine if the user's question is too personal, vague, \
or general to be stored as a reusable parameter. Reply with 'yes' if the query is personal \
(e.g. 'What should I eat today?', 'Who is the best manager?') or general small talk. \
Reply with 'no' if it is a task-specific or organizational question (e.g. 'how to get a routing number').";

const INTENT_PROMPT: &str = "You are an AI that infers and names user intent in a short, lowercase \
snake_case label. Avoid using generic labels like 'general_query'. Instead, generate a concise but \
specific label like 'compare_interest_rates', 'find_fee_policy', or 'print_check_procedure' based on \
the actual user goal.";

pub struct IntentAnalyzer {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl IntentAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Whether the conversation is personal or small talk and should not
    /// feed the trust engine. Backend failures count as "not filterable".
    pub async fn is_filterable(&self, messages: &[ChatMessage]) -> bool {
        let user_text = user_turns(messages).join("\n");
        let request = LlmRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(FILTER_PROMPT),
                ChatMessage::user(format!("Should this be filtered out? {}", user_text)),
            ],
        );

        match self.provider.complete(&request).await {
            Ok(response) => {
                let filterable = response.content.to_lowercase().contains("yes");
                debug!(filterable, "Filter classification");
                filterable
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Filter classification failed");
                false
            }
        }
    }

    /// Short snake_case label for what the user wants, or [`UNKNOWN_INTENT`].
    pub async fn classify(&self, messages: &[ChatMessage]) -> String {
        let user_text = user_turns(messages).join("\n");
        let request = LlmRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(INTENT_PROMPT),
                ChatMessage::user(format!(
                    "What is the user's intent? Here's the conversation:\n\n{}",
                    user_text
                )),
            ],
        );

        match self.provider.complete(&request).await {
            Ok(response) => {
                let label = normalize_label(&response.content);
                if label.is_empty() {
                    warn!("Intent classifier returned an empty label");
                    UNKNOWN_INTENT.to_string()
                } else {
                    label
                }
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Intent classification failed");
                UNKNOWN_INTENT.to_string()
            }
        }
    }
}

/// Trim, lowercase, spaces to underscores.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}
