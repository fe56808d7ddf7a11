// sre-assistant-rs/src/handlers.rs
// HTTP handlers: decode, run the pipeline under a request context, map errors

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;
use sre_types::{IncidentEvalRequest, InsightAnalyzeRequest};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::AppState;

const INVALID_BODY: &str = "invalid request body";
const BODY_TOO_LARGE: &str = "request body too large";

/// 413 for bodies over the size limit, 400 for everything else
fn invalid_body(request_id: Uuid, rejection: JsonRejection) -> Response {
    warn!("[{}] rejected request body: {}", request_id, rejection);
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return (StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE).into_response();
    }
    (StatusCode::BAD_REQUEST, INVALID_BODY).into_response()
}

fn error_response(request_id: Uuid, operation: &str, err: PipelineError) -> Response {
    error!("[{}] {} failed: {}", request_id, operation, err);
    (err.status_code(), err.to_string()).into_response()
}

/// POST /insight/analyze
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InsightAnalyzeRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return invalid_body(request_id, rejection),
    };

    let ctx = state.request_context();
    match state.insight.analyze(&ctx, &request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(request_id, "insight analysis", err),
    }
}

/// POST /incident/eval
pub async fn evaluate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IncidentEvalRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return invalid_body(request_id, rejection),
    };

    let ctx = state.request_context();
    match state.incident.evaluate(&ctx, &request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(request_id, "incident evaluation", err),
    }
}

/// GET /health - 200 when every dependency passes, 503 otherwise
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let report = state.health.check(&state.request_context()).await;
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        warn!("Health check degraded: {}", report.message);
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

/// GET / - Root endpoint
pub async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "SRE Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "POST /insight/analyze",
            "POST /incident/eval"
        ]
    }))
}
