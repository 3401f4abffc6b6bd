//! Off-chain voting.

use crate::core::votes::VoteRequest;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    success: bool,
    prompt_id: String,
    nullifier_hash: String,
}

/// `POST /api/vote`
pub async fn cast_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let vote = state.votes.cast(request).await?;

    Ok(Json(VoteResponse {
        success: true,
        prompt_id: vote.prompt_id,
        nullifier_hash: vote.nullifier_hash,
    }))
}
