//! Storage diagnostics.

use crate::core::submissions::StoreStatus;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StorageStatusResponse {
    success: bool,
    #[serde(flatten)]
    status: StoreStatus,
}

/// `GET /api/storage/status` - which backend is live and what it holds.
pub async fn storage_status(
    State(state): State<AppState>,
) -> Result<Json<StorageStatusResponse>, ApiError> {
    let status = state.store.status().await?;
    Ok(Json(StorageStatusResponse {
        success: true,
        status,
    }))
}
