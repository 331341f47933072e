//! Trusted parameter inspection and explicit conflict resolution.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use docent_logging::{ServiceEvent, ServiceEventLogger};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::server::GatewayState;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TrustedParameters {
    pub trusted: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub parameter: String,
    pub value: String,
}

/// `GET /api/parameters`
pub async fn list_parameters(State(state): State<GatewayState>) -> Json<TrustedParameters> {
    Json(TrustedParameters {
        trusted: state.trust.trusted().await,
    })
}

/// `POST /api/parameters/resolve`
pub async fn resolve_parameter(
    State(state): State<GatewayState>,
    Json(request): Json<ResolveRequest>,
) -> (StatusCode, Json<Value>) {
    let parameter = request.parameter.trim();
    let value = request.value.trim();
    if parameter.is_empty() || value.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "parameter and value are required" })),
        );
    }

    if let Err(e) = state.trust.resolve(parameter, value).await {
        error!(parameter, error = %e, "Failed to resolve parameter");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", e) })),
        );
    }

    ServiceEventLogger::log_event(ServiceEvent::ParameterResolved {
        parameter: parameter.to_string(),
        value: value.to_string(),
    });
    (
        StatusCode::OK,
        Json(json!({ "status": "resolved", "parameter": parameter, "value": value })),
    )
}
