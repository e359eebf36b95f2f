use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::models::job::{JobStatusResponse, SubmitJobRequest, SubmitJobResponse};
use crate::services::engine::EngineError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// POST /api/submit — submit a batch of store visits for processing.
///
/// The request shape is validated here and the count/visit invariant is
/// checked again by the engine; both layers reject independently.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> Result<(StatusCode, Json<SubmitJobResponse>), (StatusCode, Json<ErrorBody>)> {
    request
        .validate()
        .map_err(|report| bad_request(format!("invalid request: {report}")))?;

    let job_id = state
        .engine
        .create_job(request)
        .map_err(|err| bad_request(err.to_string()))?;

    Ok((StatusCode::CREATED, Json(SubmitJobResponse { job_id })))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub jobid: Option<String>,
}

/// GET /api/status?jobid= — poll a job's status.
///
/// An unknown id is a client-input fault, not a server fault.
pub async fn get_job_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<JobStatusResponse>, (StatusCode, Json<ErrorBody>)> {
    let job_id = params
        .jobid
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("missing jobid parameter"))?;

    match state.engine.get_job_status(&job_id) {
        Ok(status) => Ok(Json(status)),
        Err(EngineError::JobNotFound) => Err(bad_request("job not found")),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )),
    }
}
