//! REST API handlers for the oracle service

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::server::AppState;
use super::ConflictVerdict;
use crate::ingest::RawEvent;
use crate::metrics;

// ============================================================================
// API Types
// ============================================================================

/// Conflict check request; events may carry minute counts or `HH:MM` times
#[derive(Debug, Default, Deserialize)]
pub struct ConflictRequest {
    #[serde(default)]
    pub first: Option<RawEvent>,
    #[serde(default)]
    pub second: Option<RawEvent>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/events/conflict", post(check_conflict))
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// Conflict check endpoint
async fn check_conflict(
    State(state): State<AppState>,
    Json(request): Json<ConflictRequest>,
) -> impl IntoResponse {
    let started = Instant::now();

    let (Some(first), Some(second)) = (request.first, request.second) else {
        metrics::record_api_request("/api/events/conflict", 400, started.elapsed().as_secs_f64());
        return (
            StatusCode::BAD_REQUEST,
            Json(ConflictVerdict {
                conflict: false,
                reason: Some("Missing event data".to_string()),
            }),
        );
    };

    let first = first.normalize();
    let second = second.normalize();
    let verdict = state.oracle.evaluate(&first, &second).await;

    tracing::debug!(
        first = %first.display_title(),
        second = %second.display_title(),
        conflict = verdict.conflict,
        "Conflict check served"
    );
    metrics::record_api_request("/api/events/conflict", 200, started.elapsed().as_secs_f64());

    (StatusCode::OK, Json(verdict))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus exposition endpoint
async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("Failed to encode metrics: {e}"),
        ),
    }
}
