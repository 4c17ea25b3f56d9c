//! Health check handler

use axum::{Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::HealthResponse;

/// Health check endpoint
///
/// Pings the datastore. Internal details are logged, never returned.
///
/// - Healthy: 200 OK + {"status":"ok","version":...}
/// - Unhealthy: 503 Service Unavailable + {"status":"unavailable"}
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Datastore unreachable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.ledger.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                version: Some(state.version.to_string()),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, backend = state.ledger.backend(), "[HEALTH] datastore ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    version: None,
                }),
            )
        }
    }
}
