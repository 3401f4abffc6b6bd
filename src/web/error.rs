//! API error types and response formatting.

use crate::core::dashboard::DashboardError;
use crate::core::moderation::ModerationResult;
use crate::core::submissions::{StoreError, SubmissionError};
use crate::core::votes::VoteError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The submission was flagged by moderation. Nothing was stored.
    #[error("prompt flagged by moderation")]
    Flagged(Box<ModerationResult>),

    /// Moderation passed but the row store refused the write.
    #[error("failed to persist submission: {0}")]
    Persistence(String),

    /// The nullifier was already spent.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else that went wrong server-side.
    #[error("{message}: {details}")]
    Internal {
        message: &'static str,
        details: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Flagged(moderation) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Prompt flagged by moderation",
                    "reason": moderation.categories.summary(),
                    "flagged": true,
                    "categories": moderation.categories,
                    "riskLevel": moderation.risk_level,
                }),
            ),
            Self::Persistence(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to persist submission", "details": details }),
            ),
            Self::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            Self::Internal { message, details } => {
                tracing::error!(error = %details, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(msg) => Self::BadRequest(msg),
            SubmissionError::Persistence(store) => Self::Persistence(store.to_string()),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::Invalid(msg) => Self::BadRequest(msg),
            VoteError::Duplicate => Self::Conflict("Vote already recorded".to_string()),
            VoteError::StorageError(details) => Self::Internal {
                message: "Failed to record vote",
                details,
            },
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self::Internal {
            message: "Failed to load prompts",
            details: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal {
            message: "Storage unavailable",
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_vote_is_conflict() {
        let (status, body) = body_json(VoteError::Duplicate.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Vote already recorded");
    }

    #[tokio::test]
    async fn test_persistence_is_distinct_from_rejection() {
        let err: ApiError =
            SubmissionError::Persistence(StoreError::Backend("quota".to_string())).into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to persist submission");
        assert!(body["details"].as_str().unwrap().contains("quota"));
        assert!(body.get("flagged").is_none());
    }
}
