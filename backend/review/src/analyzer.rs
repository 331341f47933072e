//! Per-conversation analysis: question logging, filtering, intent
//! classification and trust voting.

use std::sync::Arc;

use docent_core::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::intent::IntentAnalyzer;
use crate::question_log::QuestionLog;
use crate::trust::{ParameterTrustEngine, SuggestionOutcome};

/// Parameter name the classified intent is voted under.
pub const INTENT_PARAMETER: &str = "intent";

/// One entry of an analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Pathway {
    Suggestion(SuggestionOutcome),
    Error { error: String },
}

pub struct ConversationAnalyzer {
    intents: IntentAnalyzer,
    questions: QuestionLog,
    trust: Arc<ParameterTrustEngine>,
}

impl ConversationAnalyzer {
    pub fn new(intents: IntentAnalyzer, questions: QuestionLog, trust: Arc<ParameterTrustEngine>) -> Self {
        Self {
            intents,
            questions,
            trust,
        }
    }

    pub fn trust(&self) -> &Arc<ParameterTrustEngine> {
        &self.trust
    }

    /// Never fails; problems show up as [`Pathway::Error`] entries.
    pub async fn analyze(&self, messages: &[ChatMessage]) -> Vec<Pathway> {
        let mut pathways = Vec::new();

        if let Err(e) = self.questions.record(messages).await {
            warn!(error = %e, "Failed to record questions");
            pathways.push(Pathway::Error {
                error: format!("{:#}", e),
            });
            return pathways;
        }

        if self.intents.is_filterable(messages).await {
            info!("Skipping parameter suggestion: personal or non-reusable input");
            return pathways;
        }

        let intent = self.intents.classify(messages).await;
        debug!(intent = %intent, "Classified conversation");
        match self.trust.suggest(INTENT_PARAMETER, &intent).await {
            Ok(outcome) => pathways.push(Pathway::Suggestion(outcome)),
            Err(e) => {
                warn!(error = %e, "Failed to record intent suggestion");
                pathways.push(Pathway::Error {
                    error: format!("{:#}", e),
                });
            }
        }
        pathways
    }
}
