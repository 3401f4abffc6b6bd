//! Standalone content analysis.

use crate::core::moderation::ModerationResult;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

/// `POST /api/analyze` - run the full moderation pipeline on `{prompt}`
/// without storing anything.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ModerationResult>, ApiError> {
    let body = payload.map(|Json(v)| v).unwrap_or(Value::Null);
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Invalid prompt provided".to_string()))?;

    Ok(Json(state.pipeline.analyze(prompt).await))
}
