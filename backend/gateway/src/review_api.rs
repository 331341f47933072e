//! `POST /review`

use axum::{extract::State, http::StatusCode, Json};
use docent_logging::{ServiceEvent, ServiceEventLogger};
use docent_review::{ReviewOutcome, ReviewRequest};
use serde_json::{json, Value};

use crate::server::GatewayState;

pub async fn review(
    State(state): State<GatewayState>,
    Json(request): Json<ReviewRequest>,
) -> (StatusCode, Json<Value>) {
    let rating = request.rating.clone();
    let outcome = state.review.submit(request).await;

    let (label, response) = match outcome {
        ReviewOutcome::Skipped => (
            "skipped",
            (
                StatusCode::OK,
                Json(json!({ "status": "skipped", "reason": "self-review disabled" })),
            ),
        ),
        ReviewOutcome::Submitted => (
            "submitted",
            (StatusCode::ACCEPTED, Json(json!({ "status": "review submitted" }))),
        ),
        ReviewOutcome::Completed(pathways) => (
            "completed",
            (StatusCode::OK, Json(json!({ "status": "success", "pathways": pathways }))),
        ),
    };

    ServiceEventLogger::log_event(ServiceEvent::ReviewSubmitted {
        rating,
        outcome: label.to_string(),
    });
    response
}
