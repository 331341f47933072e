//! Service Event Logger
//!
//! Chat and review traffic as structured events on the `docent_events`
//! target. Free text is redacted first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceEvent {
    ChatRequest {
        backend: String,
        turns: usize,
        question: String,
    },
    ChatReply {
        intent: String,
        context_chunks: usize,
        latency_ms: u64,
    },
    ChatFailure {
        backend: String,
        error: String,
    },
    ReviewSubmitted {
        rating: String,
        outcome: String,
    },
    ParameterResolved {
        parameter: String,
        value: String,
    },
}

impl ServiceEvent {
    fn redacted(mut self) -> Self {
        match &mut self {
            ServiceEvent::ChatRequest { question, .. } => *question = redact_sensitive_data(question),
            ServiceEvent::ChatFailure { error, .. } => *error = redact_sensitive_data(error),
            ServiceEvent::ChatReply { .. }
            | ServiceEvent::ReviewSubmitted { .. }
            | ServiceEvent::ParameterResolved { .. } => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: ServiceEvent,
}

pub struct ServiceEventLogger;

impl ServiceEventLogger {
    /// Redact and emit one event.
    pub fn log_event(event: ServiceEvent) {
        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event: event.redacted(),
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "docent_events", event = %json, "Service event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_question_is_redacted() {
        let event = ServiceEvent::ChatRequest {
            backend: "hosted".into(),
            turns: 1,
            question: "my key is sk-abcdefghijklmnopqrstuvwxyz".into(),
        }
        .redacted();
        assert_eq!(
            event,
            ServiceEvent::ChatRequest {
                backend: "hosted".into(),
                turns: 1,
                question: "my key is [REDACTED_TOKEN]".into(),
            }
        );
    }

    #[test]
    fn entry_serializes_with_type_tag() {
        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event: ServiceEvent::ParameterResolved {
                parameter: "intent".into(),
                value: "find_fee_policy".into(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "parameter_resolved");
        assert_eq!(json["event"]["value"], "find_fee_policy");
    }
}
