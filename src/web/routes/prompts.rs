//! Read-only listing views.

use crate::core::dashboard::{Dashboard, PromptListing};
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// `GET /api/prompts`
pub async fn list_prompts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromptListing>>, ApiError> {
    Ok(Json(state.dashboard.listing().await?))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    success: bool,
    #[serde(flatten)]
    dashboard: Dashboard,
}

/// `GET /api/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dashboard = state.dashboard.dashboard().await?;
    Ok(Json(DashboardResponse {
        success: true,
        dashboard,
    }))
}
