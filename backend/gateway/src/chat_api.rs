//! `POST /chat`

use axum::{extract::State, http::StatusCode, Json};
use docent_chat::ChatBackend;
use docent_core::{ChatMessage, Role};
use docent_logging::{ServiceEvent, ServiceEventLogger};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::GatewayState;

pub const NO_MESSAGE_REPLY: &str = "No message provided.";
pub const LOCAL_FAILURE_REPLY: &str = "Error calling Ollama API.";
pub const HOSTED_FAILURE_REPLY: &str = "Error calling OpenAI API.";

/// Either a single `message` or a full `messages` history.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    /// The conversation to answer, or `None` when there is no user text.
    fn into_history(self) -> Option<Vec<ChatMessage>> {
        let history = match (self.messages, self.message) {
            (Some(messages), _) if !messages.is_empty() => messages,
            (_, Some(message)) => vec![ChatMessage::user(message)],
            _ => return None,
        };
        let latest = history.iter().rev().find(|m| m.role == Role::User)?;
        if latest.content.trim().is_empty() {
            return None;
        }
        Some(history)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    fn new(reply: impl Into<String>) -> Json<Self> {
        Json(Self { reply: reply.into() })
    }
}

pub async fn chat(
    State(state): State<GatewayState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let Some(history) = request.into_history() else {
        return (StatusCode::OK, ChatResponse::new(NO_MESSAGE_REPLY));
    };

    let backend = state.orchestrator.backend();
    let question = history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    ServiceEventLogger::log_event(ServiceEvent::ChatRequest {
        backend: backend.to_string(),
        turns: history.len(),
        question,
    });

    match state.orchestrator.respond(history).await {
        Ok(reply) => {
            ServiceEventLogger::log_event(ServiceEvent::ChatReply {
                intent: reply.intent,
                context_chunks: reply.context_chunks,
                latency_ms: reply.latency_ms,
            });
            (StatusCode::OK, ChatResponse::new(reply.reply))
        }
        Err(e) => {
            error!(backend = %backend, model = %state.orchestrator.model(), error = %e, "Chat completion failed");
            ServiceEventLogger::log_event(ServiceEvent::ChatFailure {
                backend: backend.to_string(),
                error: e.to_string(),
            });
            match backend {
                ChatBackend::Local => (StatusCode::INTERNAL_SERVER_ERROR, ChatResponse::new(LOCAL_FAILURE_REPLY)),
                ChatBackend::Hosted => (StatusCode::OK, ChatResponse::new(HOSTED_FAILURE_REPLY)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use docent_chat::MockProvider;

    fn single(message: &str) -> Json<ChatRequest> {
        Json(ChatRequest {
            message: Some(message.to_string()),
            messages: None,
        })
    }

    #[tokio::test]
    async fn empty_message_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Hosted, MockProvider::new("openai").with_response("hi"), None).await;

        let (status, Json(body)) = chat(State(fx.state.clone()), single("")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_MESSAGE_REPLY);

        let (_, Json(body)) = chat(State(fx.state), Json(ChatRequest::default())).await;
        assert_eq!(body.reply, NO_MESSAGE_REPLY);
        assert_eq!(fx.chat.calls(), 0);
    }

    #[tokio::test]
    async fn single_message_is_answered() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(
            dir.path(),
            ChatBackend::Hosted,
            MockProvider::new("openai").with_response("Checks can be ordered online."),
            None,
        )
        .await;

        let (status, Json(body)) = chat(State(fx.state), single("How do I order checks?")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, "Checks can be ordered online.");

        let request = fx.chat.last_request().await.unwrap();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages.last().unwrap().content, "How do I order checks?");
    }

    #[tokio::test]
    async fn history_is_forwarded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Local, MockProvider::new("ollama").with_response("ok"), None).await;

        let request = ChatRequest {
            message: None,
            messages: Some(vec![
                ChatMessage::user("What is the wire fee?"),
                ChatMessage::assistant("$25."),
                ChatMessage::user("And international?"),
            ]),
        };
        let (_, Json(body)) = chat(State(fx.state), Json(request)).await;
        assert_eq!(body.reply, "ok");

        let sent = fx.chat.last_request().await.unwrap();
        let contents: Vec<&str> = sent.messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["What is the wire fee?", "$25.", "And international?"]);
    }

    #[tokio::test]
    async fn history_without_user_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Hosted, MockProvider::new("openai").with_response("x"), None).await;

        let request = ChatRequest {
            message: None,
            messages: Some(vec![ChatMessage::assistant("Hello!"), ChatMessage::user("   ")]),
        };
        let (_, Json(body)) = chat(State(fx.state), Json(request)).await;
        assert_eq!(body.reply, NO_MESSAGE_REPLY);
        assert_eq!(fx.chat.calls(), 0);
    }

    #[tokio::test]
    async fn local_failure_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Local, MockProvider::new("ollama").failing(), None).await;

        let (status, Json(body)) = chat(State(fx.state), single("hello")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.reply, LOCAL_FAILURE_REPLY);
    }

    #[tokio::test]
    async fn hosted_failure_is_reported_in_the_reply() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Hosted, MockProvider::new("openai").failing(), None).await;

        let (status, Json(body)) = chat(State(fx.state), single("hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, HOSTED_FAILURE_REPLY);
    }
}
