// Submission service - the moderation gate in front of the row store.
//
// RECEIVED -> MODERATING -> FLAGGED_REJECTED (alert, no write)
//                        -> PERSISTING -> PERSISTED | PERSIST_FAILED
//
// Each step runs once, in order. Nothing is retried and a failed write is
// not compensated.

use super::submission_models::{FlagAlert, SubmissionOutcome, SubmissionRecord, SubmissionRequest};
use crate::core::moderation::ModerationPipeline;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Alert delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Failed to persist submission: {0}")]
    Persistence(#[from] StoreError),
}

// ============================================================================
// PORTS
// ============================================================================

/// What a store reports about itself for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub backend: String,
    pub location: String,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_sheets: Vec<String>,
}

/// Append-only storage for accepted submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &SubmissionRecord) -> Result<(), StoreError>;

    /// Every stored record, in storage order.
    async fn list(&self) -> Result<Vec<SubmissionRecord>, StoreError>;

    /// Backend description for the diagnostics endpoint.
    async fn status(&self) -> Result<StoreStatus, StoreError>;
}

/// Where flag alerts go.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, alert: &FlagAlert) -> Result<(), AlertError>;
}

// ============================================================================
// PROMPT IDS
// ============================================================================

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates short lowercase base-36 prompt ids.
#[derive(Debug, Clone, Copy)]
pub struct PromptIdGenerator {
    length: usize,
}

impl PromptIdGenerator {
    pub const DEFAULT_LENGTH: usize = 8;

    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for PromptIdGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct SubmissionService {
    pipeline: Arc<ModerationPipeline>,
    store: Arc<dyn SubmissionStore>,
    alerts: Option<Arc<dyn AlertSink>>,
    ids: PromptIdGenerator,
}

impl SubmissionService {
    pub fn new(
        pipeline: Arc<ModerationPipeline>,
        store: Arc<dyn SubmissionStore>,
        alerts: Option<Arc<dyn AlertSink>>,
        ids: PromptIdGenerator,
    ) -> Self {
        Self {
            pipeline,
            store,
            alerts,
            ids,
        }
    }

    /// Run one submission through validation, moderation and persistence.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        request
            .validate()
            .map_err(|e| SubmissionError::Validation(e.to_string()))?;

        let moderation = self.pipeline.analyze(&request.moderation_text()).await;

        if moderation.flagged {
            tracing::info!(
                title = %request.title,
                categories = %moderation.categories.summary(),
                "Submission rejected by moderation"
            );
            self.dispatch_alert(FlagAlert {
                title: request.title.clone(),
                wallet: request.wallet.clone(),
                categories: moderation.categories,
            })
            .await;
            return Ok(SubmissionOutcome::Rejected { moderation });
        }

        let record = SubmissionRecord {
            prompt_id: self.ids.generate(),
            tags: request.tag_list(),
            title: request.title,
            prompt: request.prompt,
            premium: request.premium,
            image_url: request.image_url.filter(|u| !u.trim().is_empty()),
            wallet: request.wallet.filter(|w| !w.trim().is_empty()),
            created_at: Utc::now(),
        };

        if let Err(err) = self.store.append(&record).await {
            tracing::error!(
                prompt_id = %record.prompt_id,
                error = %err,
                "Failed to persist submission"
            );
            return Err(SubmissionError::Persistence(err));
        }

        tracing::info!(prompt_id = %record.prompt_id, "Submission persisted");
        Ok(SubmissionOutcome::Persisted {
            prompt_id: record.prompt_id,
        })
    }

    /// Best effort: failures are logged and otherwise ignored.
    async fn dispatch_alert(&self, alert: FlagAlert) {
        let Some(sink) = &self.alerts else {
            tracing::debug!("No alert channel configured");
            return;
        };

        if let Err(err) = sink.send_alert(&alert).await {
            tracing::warn!(error = %err, "Failed to deliver moderation alert");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
