pub mod health;
pub mod jobs;
pub mod metrics;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// Build the API router. The /metrics route carries its own state and is
/// wired up separately by the server binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/submit", post(jobs::submit_job))
        .route("/api/status", get(jobs::get_job_status))
        .with_state(state)
}
