//! Listing submission.

use crate::core::submissions::{SubmissionOutcome, SubmissionRequest};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    success: bool,
    prompt_id: String,
}

/// `POST /api/submit` - moderate a listing and store it if clean.
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match state.submissions.submit(request).await? {
        SubmissionOutcome::Persisted { prompt_id } => Ok(Json(SubmitResponse {
            success: true,
            prompt_id,
        })),
        SubmissionOutcome::Rejected { moderation } => Err(ApiError::Flagged(Box::new(moderation))),
    }
}
