// =============================================================================
// OPENAI MODERATION CLIENT
// =============================================================================
//
// Implements `ModerationProvider` against the OpenAI-compatible `/moderations`
// endpoint. Any base URL that speaks the same protocol works.
//
// Upstream categories are folded into our six:
// - `hate*`, `harassment*`, `violence*`, `sexual*` map by prefix
// - `self-harm*` maps to `self_harm`
// - `illicit*` maps to `illegal`
// Anything else is ignored.

use crate::core::moderation::{
    Category, CategoryFlags, ModerationProvider, ModerationResult, ProviderError, RiskLevel,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiModerationClient {
    client: Client,
    api_key: String,
    base_url: String,
}

// =============================================================================
// API DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationEntry>,
}

#[derive(Debug, Deserialize)]
struct ModerationEntry {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, bool>,
    #[serde(default)]
    category_scores: HashMap<String, f64>,
}

fn map_category(upstream: &str) -> Option<Category> {
    let root = upstream.split('/').next().unwrap_or(upstream);
    match root {
        "hate" => Some(Category::Hate),
        "harassment" => Some(Category::Harassment),
        "violence" => Some(Category::Violence),
        "sexual" => Some(Category::Sexual),
        "self-harm" => Some(Category::SelfHarm),
        "illicit" => Some(Category::Illegal),
        _ => None,
    }
}

impl OpenAiModerationClient {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn interpret(entry: ModerationEntry) -> ModerationResult {
        let mut categories = CategoryFlags::default();
        let mut flagged_words: Vec<String> = entry
            .categories
            .iter()
            .filter(|(_, hit)| **hit)
            .map(|(name, _)| name.clone())
            .collect();
        flagged_words.sort();

        for name in &flagged_words {
            if let Some(category) = map_category(name) {
                categories.set(category, true);
            }
        }

        let confidence = entry
            .category_scores
            .values()
            .copied()
            .fold(0.0_f64, f64::max);

        let suggestions = if entry.flagged {
            categories
                .flagged()
                .into_iter()
                .map(|c| c.advisory().to_string())
                .collect()
        } else {
            vec!["Content appears safe and appropriate".to_string()]
        };

        ModerationResult {
            flagged: entry.flagged,
            categories,
            confidence,
            provider: "OpenAI Moderation".to_string(),
            flagged_words,
            risk_level: RiskLevel::from_score(entry.flagged, confidence),
            suggestions,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl ModerationProvider for OpenAiModerationClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn moderate(&self, content: &str) -> Result<ModerationResult, ProviderError> {
        let url = format!("{}/moderations", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "input": content }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: ModerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let entry = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no moderation results".to_string()))?;

        Ok(Self::interpret(entry))
    }
}
