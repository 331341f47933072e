//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use docent_chat::ChatOrchestrator;
use docent_memory::EmbeddingStore;
use docent_review::{ParameterTrustEngine, ReviewService};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{chat_api, health_api, parameters_api, review_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub review: Arc<ReviewService>,
    pub trust: Arc<ParameterTrustEngine>,
    pub store: Arc<EmbeddingStore>,
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/chat", post(chat_api::chat))
        .route("/review", post(review_api::review))
        .route("/api/health", get(health_api::get_health))
        .route("/api/parameters", get(parameters_api::list_parameters))
        .route("/api/parameters/resolve", post(parameters_api::resolve_parameter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
