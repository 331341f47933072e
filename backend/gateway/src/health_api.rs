//! `GET /api/health`

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Embedding records currently loaded.
    pub records: usize,
    /// Number of trusted parameters.
    pub trusted: usize,
}

pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        service: "docent".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        records: state.store.len().await,
        trusted: state.trust.trusted().await.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use docent_chat::{ChatBackend, MockProvider};
    use docent_core::{Chunk, EmbeddingRecord};

    #[tokio::test]
    async fn reports_store_and_trust_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(dir.path(), ChatBackend::Hosted, MockProvider::new("openai"), None).await;

        let Json(empty) = get_health(State(fx.state.clone())).await;
        assert_eq!(empty.status, "ok");
        assert_eq!(empty.records, 0);
        assert_eq!(empty.trusted, 0);

        fx.state
            .store
            .replace(vec![EmbeddingRecord::from_chunk(Chunk::new("a.png", "fees"), vec![1.0, 0.0])])
            .await;
        fx.state.trust.resolve("intent", "find_fee_policy").await.unwrap();

        let Json(report) = get_health(State(fx.state)).await;
        assert_eq!(report.records, 1);
        assert_eq!(report.trusted, 1);
    }
}
