//! API route definitions.

mod health;
mod moderation;
mod prompts;
mod storage;
mod submissions;
mod votes;

use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::web::state::AppState;

/// Build the complete router.
///
/// # Route Structure
///
/// - `GET /health` - Liveness probe
/// - `POST /api/submit` - Moderate and store a listing
/// - `POST /api/analyze` - Moderate text without storing it
/// - `GET /api/prompts` - Stored listings, newest first
/// - `GET /api/dashboard` - Aggregates over listings and votes
/// - `POST /api/vote` - Record a nullifier-gated vote
/// - `GET /api/storage/status` - Active storage backend diagnostics
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/submit", post(submissions::submit))
        .route("/analyze", post(moderation::analyze))
        .route("/prompts", get(prompts::list_prompts))
        .route("/dashboard", get(prompts::dashboard))
        .route("/vote", post(votes::cast_vote))
        .route("/storage/status", get(storage::storage_status));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path()
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
