use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub stores_loaded: usize,
    pub jobs_tracked: usize,
}

/// GET /health — liveness plus a snapshot of in-memory state.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stores_loaded: state.catalog.len(),
        jobs_tracked: state.jobs.len(),
    })
}
