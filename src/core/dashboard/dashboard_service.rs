// Listing and dashboard views.
//
// Everything here is computed from stored submissions and recorded votes.
// Tips and earnings live on-chain and are not reported.

use crate::core::submissions::{StoreError, SubmissionRecord, SubmissionStore};
use crate::core::votes::{Vote, VoteError, VoteService, VoteStore, VoteTally};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const RECENT_ACTIVITY_LIMIT: usize = 5;
const DAYS_IN_CHART: i64 = 7;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Votes(#[from] VoteError),
}

// ============================================================================
// VIEW MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptListing {
    pub prompt_id: String,
    pub title: String,
    pub prompt: String,
    pub tags: Vec<String>,
    pub premium: bool,
    pub image_url: Option<String>,
    pub creator: Option<String>,
    pub created_at: DateTime<Utc>,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSummary {
    pub prompt_id: String,
    pub title: String,
    pub premium: bool,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_prompts: usize,
    pub premium_prompts: usize,
    pub total_votes: u64,
    pub upvotes: u64,
    pub downvotes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Submission,
    Vote,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub prompt_id: String,
    pub prompt_title: String,
    pub from: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub prompts: Vec<PromptSummary>,
    pub recent_activity: Vec<Activity>,
    pub submissions_by_day: Vec<DailyCount>,
}

// ============================================================================
// PURE VIEW BUILDERS
// ============================================================================

fn newest_first(records: &[SubmissionRecord]) -> Vec<&SubmissionRecord> {
    let mut sorted: Vec<&SubmissionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

fn score(tallies: &HashMap<String, VoteTally>, prompt_id: &str) -> i64 {
    tallies.get(prompt_id).map(VoteTally::score).unwrap_or(0)
}

/// Public listing, newest first.
pub fn build_listing(
    records: &[SubmissionRecord],
    tallies: &HashMap<String, VoteTally>,
) -> Vec<PromptListing> {
    newest_first(records)
        .into_iter()
        .map(|r| PromptListing {
            prompt_id: r.prompt_id.clone(),
            title: r.title.clone(),
            prompt: r.prompt.clone(),
            tags: r.tags.clone(),
            premium: r.premium,
            image_url: r.image_url.clone(),
            creator: r.wallet.clone(),
            created_at: r.created_at,
            votes: score(tallies, &r.prompt_id),
        })
        .collect()
}

/// Dashboard aggregates. `now` fixes the end of the daily chart.
pub fn build_dashboard(
    records: &[SubmissionRecord],
    tallies: &HashMap<String, VoteTally>,
    recent_votes: &[Vote],
    now: DateTime<Utc>,
) -> Dashboard {
    let sorted = newest_first(records);

    let (upvotes, downvotes) = tallies
        .values()
        .fold((0, 0), |(u, d), t| (u + t.upvotes, d + t.downvotes));
    let stats = DashboardStats {
        total_prompts: records.len(),
        premium_prompts: records.iter().filter(|r| r.premium).count(),
        total_votes: upvotes + downvotes,
        upvotes,
        downvotes,
    };

    let prompts = sorted
        .iter()
        .map(|r| PromptSummary {
            prompt_id: r.prompt_id.clone(),
            title: r.title.clone(),
            premium: r.premium,
            votes: score(tallies, &r.prompt_id),
            created_at: r.created_at,
            image_url: r.image_url.clone(),
        })
        .collect();

    let titles: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.prompt_id.as_str(), r.title.as_str()))
        .collect();

    let mut recent_activity: Vec<Activity> = sorted
        .iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|r| Activity {
            id: format!("submission_{}", r.prompt_id),
            kind: ActivityKind::Submission,
            prompt_id: r.prompt_id.clone(),
            prompt_title: r.title.clone(),
            from: r.wallet.clone(),
            timestamp: r.created_at,
        })
        .chain(recent_votes.iter().map(|v| Activity {
            id: format!("vote_{}", v.nullifier_hash),
            kind: ActivityKind::Vote,
            prompt_id: v.prompt_id.clone(),
            prompt_title: titles
                .get(v.prompt_id.as_str())
                .map(|t| t.to_string())
                .unwrap_or_else(|| "Unknown prompt".to_string()),
            from: v.voter.clone(),
            timestamp: v.cast_at,
        }))
        .collect();
    recent_activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

    let today = now.date_naive();
    let submissions_by_day = (0..DAYS_IN_CHART)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = records
                .iter()
                .filter(|r| r.created_at.date_naive() == date)
                .count();
            DailyCount { date, count }
        })
        .collect();

    Dashboard {
        stats,
        prompts,
        recent_activity,
        submissions_by_day,
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct DashboardService<V: VoteStore> {
    store: Arc<dyn SubmissionStore>,
    votes: Arc<VoteService<V>>,
}

impl<V: VoteStore> DashboardService<V> {
    pub fn new(store: Arc<dyn SubmissionStore>, votes: Arc<VoteService<V>>) -> Self {
        Self { store, votes }
    }

    pub async fn listing(&self) -> Result<Vec<PromptListing>, DashboardError> {
        let records = self.store.list().await?;
        let tallies = self.votes.tallies().await?;
        Ok(build_listing(&records, &tallies))
    }

    pub async fn dashboard(&self) -> Result<Dashboard, DashboardError> {
        let records = self.store.list().await?;
        let tallies = self.votes.tallies().await?;
        let recent = self.votes.recent_votes(RECENT_ACTIVITY_LIMIT).await?;
        Ok(build_dashboard(&records, &tallies, &recent, Utc::now()))
    }
}
