// Vote ledger - records off-chain votes on prompt listings.
//
// A vote carries a nullifier hash that proves a unique voter. Each nullifier
// may be spent once; a second vote with the same hash is refused.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// Body of `POST /api/vote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub prompt_id: String,
    pub nullifier_hash: String,
    #[serde(default = "default_upvote")]
    pub is_upvote: bool,
    pub voter: Option<String>,
    pub proof: Option<String>,
}

fn default_upvote() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub prompt_id: String,
    pub nullifier_hash: String,
    pub is_upvote: bool,
    pub voter: Option<String>,
    pub proof: Option<String>,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteTally {
    /// Upvotes minus downvotes.
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Invalid vote: {0}")]
    Invalid(String),

    #[error("Vote already recorded for this nullifier")]
    Duplicate,

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Insert a vote. Returns `false` if the nullifier was already used.
    async fn record_vote(&self, vote: &Vote) -> Result<bool, VoteError>;

    /// Tally per prompt id.
    async fn tallies(&self) -> Result<HashMap<String, VoteTally>, VoteError>;

    /// Most recent votes, newest first.
    async fn recent_votes(&self, limit: usize) -> Result<Vec<Vote>, VoteError>;
}

// Lets the service hold a trait object so the backend is picked at startup.
#[async_trait]
impl VoteStore for Box<dyn VoteStore> {
    async fn record_vote(&self, vote: &Vote) -> Result<bool, VoteError> {
        (**self).record_vote(vote).await
    }

    async fn tallies(&self) -> Result<HashMap<String, VoteTally>, VoteError> {
        (**self).tallies().await
    }

    async fn recent_votes(&self, limit: usize) -> Result<Vec<Vote>, VoteError> {
        (**self).recent_votes(limit).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct VoteService<S: VoteStore> {
    store: S,
}

impl<S: VoteStore> VoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn cast(&self, request: VoteRequest) -> Result<Vote, VoteError> {
        let prompt_id = request.prompt_id.trim();
        let nullifier = request.nullifier_hash.trim();
        if prompt_id.is_empty() {
            return Err(VoteError::Invalid("promptId is required".to_string()));
        }
        if nullifier.is_empty() {
            return Err(VoteError::Invalid("nullifierHash is required".to_string()));
        }

        let vote = Vote {
            prompt_id: prompt_id.to_string(),
            nullifier_hash: nullifier.to_string(),
            is_upvote: request.is_upvote,
            voter: request.voter,
            proof: request.proof,
            cast_at: Utc::now(),
        };

        if !self.store.record_vote(&vote).await? {
            tracing::info!(prompt_id = %vote.prompt_id, "Duplicate vote refused");
            return Err(VoteError::Duplicate);
        }

        tracing::info!(
            prompt_id = %vote.prompt_id,
            upvote = vote.is_upvote,
            "Vote recorded"
        );
        Ok(vote)
    }

    pub async fn tallies(&self) -> Result<HashMap<String, VoteTally>, VoteError> {
        self.store.tallies().await
    }

    pub async fn recent_votes(&self, limit: usize) -> Result<Vec<Vote>, VoteError> {
        self.store.recent_votes(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::votes::InMemoryVoteStore;

    fn request(prompt_id: &str, nullifier: &str, up: bool) -> VoteRequest {
        VoteRequest {
            prompt_id: prompt_id.to_string(),
            nullifier_hash: nullifier.to_string(),
            is_upvote: up,
            voter: None,
            proof: None,
        }
    }

    #[tokio::test]
    async fn test_vote_is_recorded_and_tallied() {
        let service = VoteService::new(InMemoryVoteStore::new());

        service.cast(request("abc", "n1", true)).await.unwrap();
        service.cast(request("abc", "n2", true)).await.unwrap();
        service.cast(request("abc", "n3", false)).await.unwrap();

        let tallies = service.tallies().await.unwrap();
        let tally = tallies["abc"];
        assert_eq!(tally.upvotes, 2);
        assert_eq!(tally.downvotes, 1);
        assert_eq!(tally.score(), 1);
    }

    #[tokio::test]
    async fn test_nullifier_is_single_use() {
        let service = VoteService::new(InMemoryVoteStore::new());

        service.cast(request("abc", "same", true)).await.unwrap();
        let err = service.cast(request("def", "same", true)).await.unwrap_err();

        assert!(matches!(err, VoteError::Duplicate));
        assert!(!service.tallies().await.unwrap().contains_key("def"));
    }

    #[tokio::test]
    async fn test_blank_fields_are_invalid() {
        let service = VoteService::new(InMemoryVoteStore::new());

        let err = service.cast(request(" ", "n1", true)).await.unwrap_err();
        assert!(matches!(err, VoteError::Invalid(_)));

        let err = service.cast(request("abc", "", true)).await.unwrap_err();
        assert!(matches!(err, VoteError::Invalid(_)));
    }

    #[test]
    fn test_vote_request_defaults_to_upvote() {
        let request: VoteRequest =
            serde_json::from_str(r#"{"promptId":"abc","nullifierHash":"0x1"}"#).unwrap();
        assert!(request.is_upvote);
    }
}
