// Submission domain models.
//
// The inbound request, the record we append to the row store, and the
// canonical row layout shared by every store implementation.

use crate::core::moderation::{CategoryFlags, ModerationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MAX_TITLE_LEN: u64 = 200;
pub const MAX_PROMPT_LEN: u64 = 10_000;
pub const MAX_TAGS: usize = 20;

/// Tags arrive either as a JSON array or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    /// Trimmed, non-empty tags in input order.
    pub fn normalized(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TagsInput::List(items) => items.iter().map(|s| s.as_str()).collect(),
            TagsInput::Text(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn tag_count(tags: &TagsInput) -> Result<(), ValidationError> {
    if tags.normalized().len() > MAX_TAGS {
        return Err(ValidationError::new("too_many_tags"));
    }
    Ok(())
}

/// Body of `POST /api/submit`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[validate(length(max = MAX_TITLE_LEN), custom(function = "not_blank"))]
    pub title: String,

    #[validate(length(max = MAX_PROMPT_LEN), custom(function = "not_blank"))]
    pub prompt: String,

    #[validate(custom(function = "tag_count"))]
    pub tags: Option<TagsInput>,

    #[serde(default)]
    pub premium: bool,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    pub wallet: Option<String>,
}

impl SubmissionRequest {
    /// The text that goes through moderation.
    pub fn moderation_text(&self) -> String {
        format!("{}\n{}", self.title, self.prompt)
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_ref()
            .map(TagsInput::normalized)
            .unwrap_or_default()
    }
}

/// A listing that passed moderation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub prompt_id: String,
    pub title: String,
    pub prompt: String,
    pub tags: Vec<String>,
    pub premium: bool,
    pub image_url: Option<String>,
    pub wallet: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Canonical row: `[promptId, title, prompt, tags, premium, imageUrl, createdAt, wallet]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.prompt_id.clone(),
            self.title.clone(),
            self.prompt.clone(),
            self.tags.join(", "),
            if self.premium { "TRUE" } else { "FALSE" }.to_string(),
            self.image_url.clone().unwrap_or_default(),
            self.created_at.to_rfc3339(),
            self.wallet.clone().unwrap_or_default(),
        ]
    }

    /// Parse a canonical row. Missing cells fall back to defaults; `index`
    /// names rows that have no id.
    pub fn from_row(index: usize, row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).map(|s| s.trim()).filter(|s| !s.is_empty());

        let created_at = cell(6)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| {
                tracing::debug!(row = index, "Row has no valid createdAt, using now");
                Utc::now()
            });

        Self {
            prompt_id: cell(0)
                .map(str::to_string)
                .unwrap_or_else(|| format!("prompt_{}", index)),
            title: cell(1)
                .map(str::to_string)
                .unwrap_or_else(|| "Untitled Prompt".to_string()),
            prompt: cell(2).map(str::to_string).unwrap_or_default(),
            tags: cell(3)
                .map(|t| TagsInput::Text(t.to_string()).normalized())
                .unwrap_or_default(),
            premium: cell(4).is_some_and(|v| v.eq_ignore_ascii_case("TRUE")),
            image_url: cell(5).map(str::to_string),
            created_at,
            wallet: cell(7).map(str::to_string),
        }
    }
}

/// Summary forwarded to the alert channel when a submission is flagged.
#[derive(Debug, Clone)]
pub struct FlagAlert {
    pub title: String,
    pub wallet: Option<String>,
    pub categories: CategoryFlags,
}

impl FlagAlert {
    pub fn message(&self) -> String {
        format!(
            "🚨 Prompt flagged by moderation!\nTitle: {}\nWallet: {}\nReason: {}",
            self.title,
            self.wallet.as_deref().unwrap_or("unknown"),
            self.categories.summary()
        )
    }
}

/// Terminal state of a submission that did not error.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Passed moderation and was appended to the store.
    Persisted { prompt_id: String },
    /// Flagged by moderation; nothing was stored.
    Rejected { moderation: ModerationResult },
}
