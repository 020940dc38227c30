//! Health endpoint

use crate::backend::server::state::AppState;
use crate::shared::health::HealthResponse;
use axum::extract::State;
use axum::Json;

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut response = HealthResponse::ok();
    response
        .extra
        .insert("uptimeSeconds".to_string(), state.uptime_seconds().into());
    tracing::debug!("Health check served");
    Json(response)
}
