use crate::core::moderation::{
    Category, CategoryFlags, ModerationProvider, ModerationResult, ProviderError, RiskLevel,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_HUGGINGFACE_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/roberta-hate-speech-detection";

/// The model's positive ("hate") class.
const HATE_LABEL: &str = "LABEL_1";
const FLAG_THRESHOLD: f64 = 0.7;

/// Hugging Face hosted hate-speech classifier.
///
/// Only detects one dimension, so only `hate` can ever be set.
pub struct HuggingFaceClassifier {
    client: Client,
    api_key: String,
    url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The inference API answers with a bare object, a list, or a list of lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Single(LabelScore),
    List(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl ClassifierResponse {
    fn first(self) -> Option<LabelScore> {
        match self {
            ClassifierResponse::Single(entry) => Some(entry),
            ClassifierResponse::List(entries) => entries.into_iter().next(),
            ClassifierResponse::Nested(batches) => batches.into_iter().flatten().next(),
        }
    }
}

impl HuggingFaceClassifier {
    pub fn new(client: Client, api_key: String, url: String) -> Self {
        Self {
            client,
            api_key,
            url,
        }
    }

    fn interpret(entry: &LabelScore) -> ModerationResult {
        let flagged = entry.label == HATE_LABEL && entry.score > FLAG_THRESHOLD;

        let mut categories = CategoryFlags::default();
        categories.set(Category::Hate, flagged);

        let suggestions = if flagged {
            vec![
                "Content may contain hate speech - consider revising".to_string(),
                "Use more inclusive and respectful language".to_string(),
            ]
        } else {
            vec!["Content appears safe from hate speech detection".to_string()]
        };

        ModerationResult {
            flagged,
            categories,
            confidence: entry.score,
            provider: "Hugging Face AI".to_string(),
            flagged_words: if flagged {
                vec!["hate_speech_detected".to_string()]
            } else {
                Vec::new()
            },
            risk_level: RiskLevel::from_score(flagged, entry.score),
            suggestions,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl ModerationProvider for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn moderate(&self, content: &str) -> Result<ModerationResult, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "inputs": content }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: ClassifierResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let entry = parsed
            .first()
            .ok_or_else(|| ProviderError::Malformed("empty classification list".to_string()))?;

        Ok(Self::interpret(&entry))
    }
}
