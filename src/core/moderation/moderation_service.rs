// Moderation pipeline - core decision logic.
//
// The local keyword analyzer always runs. Remote classifiers are tried in
// configured order; the first one that answers is merged with the local
// result. A provider error moves on to the next provider. This is fallback,
// not retry: a provider that answered "not flagged" ends the chain.
//
// NO HTTP dependencies here - remote classifiers live in infra.

use super::keyword_analyzer::LocalKeywordAnalyzer;
use super::moderation_models::ModerationResult;
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

// ============================================================================
// PROVIDER TRAIT (PORT)
// ============================================================================

/// A remote moderation decision source.
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Classify one piece of text.
    async fn moderate(&self, content: &str) -> Result<ModerationResult, ProviderError>;
}

// ============================================================================
// MERGE POLICY
// ============================================================================

/// Combine the local result with a remote one.
///
/// Flags and categories are OR-ed. Confidence, flagged words, risk level and
/// timestamp stay the local ones; the remote confidence is dropped.
/// Suggestions are concatenated without deduplication.
pub fn merge(local: &ModerationResult, remote: &ModerationResult) -> ModerationResult {
    let mut suggestions = local.suggestions.clone();
    suggestions.extend(remote.suggestions.iter().cloned());

    ModerationResult {
        flagged: local.flagged || remote.flagged,
        categories: local.categories.union(&remote.categories),
        confidence: local.confidence,
        provider: format!("{} + {}", local.provider, remote.provider),
        flagged_words: local.flagged_words.clone(),
        risk_level: local.risk_level,
        suggestions,
        timestamp: local.timestamp,
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Runs the local analyzer plus an ordered chain of remote providers.
pub struct ModerationPipeline {
    local: LocalKeywordAnalyzer,
    remotes: Vec<Box<dyn ModerationProvider>>,
}

impl ModerationPipeline {
    pub fn new(local: LocalKeywordAnalyzer, remotes: Vec<Box<dyn ModerationProvider>>) -> Self {
        Self { local, remotes }
    }

    /// Labels of the configured remote providers, in order.
    pub fn remote_names(&self) -> Vec<String> {
        self.remotes.iter().map(|p| p.name().to_string()).collect()
    }

    /// Ask one remote provider; on any error return the local analysis instead.
    pub async fn remote_or_local(
        &self,
        provider: &dyn ModerationProvider,
        content: &str,
    ) -> ModerationResult {
        match provider.moderate(content).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %err,
                    "Remote moderation failed, using local analysis"
                );
                self.local.analyze(content)
            }
        }
    }

    /// Full decision for a piece of content.
    pub async fn analyze(&self, content: &str) -> ModerationResult {
        let local = self.local.analyze(content);

        for provider in &self.remotes {
            match provider.moderate(content).await {
                Ok(remote) => {
                    let merged = merge(&local, &remote);
                    tracing::info!(
                        provider = %merged.provider,
                        flagged = merged.flagged,
                        risk_level = %merged.risk_level,
                        "Moderation decision"
                    );
                    return merged;
                }
                Err(err) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %err,
                        "Remote moderation failed, trying next provider"
                    );
                }
            }
        }

        tracing::info!(
            provider = %local.provider,
            flagged = local.flagged,
            risk_level = %local.risk_level,
            "Moderation decision"
        );
        local
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{Category, CategoryFlags, RiskLevel};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider that answers with a canned result or error and counts calls.
    struct MockProvider {
        label: &'static str,
        answer: Option<ModerationResult>,
        calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn ok(label: &'static str, answer: ModerationResult) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                label,
                answer: Some(answer),
                calls: Arc::clone(&calls),
            };
            (provider, calls)
        }

        fn failing(label: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                label,
                answer: None,
                calls: Arc::clone(&calls),
            };
            (provider, calls)
        }
    }

    #[async_trait]
    impl ModerationProvider for MockProvider {
        fn name(&self) -> &str {
            self.label
        }

        async fn moderate(&self, _content: &str) -> Result<ModerationResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| ProviderError::Transport("connection refused".to_string()))
        }
    }

    fn remote_hate(flagged: bool) -> ModerationResult {
        let mut categories = CategoryFlags::default();
        categories.set(Category::Hate, flagged);
        ModerationResult {
            flagged,
            categories,
            confidence: 0.99,
            provider: "Remote".to_string(),
            flagged_words: vec!["hate_speech_detected".to_string()],
            risk_level: RiskLevel::from_score(flagged, 0.99),
            suggestions: vec!["remote says".to_string()],
            timestamp: Utc::now(),
        }
    }

    fn pipeline(remotes: Vec<Box<dyn ModerationProvider>>) -> ModerationPipeline {
        ModerationPipeline::new(LocalKeywordAnalyzer::default(), remotes)
    }

    #[test]
    fn test_merge_with_self_is_stable() {
        let local = LocalKeywordAnalyzer::default();
        for text in ["kill kill murder", "Write a friendly poem", "nsfw fraud"] {
            let result = local.analyze(text);
            let merged = merge(&result, &result);

            assert_eq!(merged.flagged, result.flagged);
            for (category, flag) in result.categories.iter() {
                assert!(!flag || merged.categories.get(category));
            }
            assert_eq!(merged.confidence, result.confidence);
        }
    }

    #[test]
    fn test_merge_keeps_local_confidence_and_concatenates_suggestions() {
        let local = LocalKeywordAnalyzer::default().analyze("a violent attack");
        let remote = remote_hate(false);

        let merged = merge(&local, &remote);
        assert!(merged.flagged);
        assert!(merged.categories.violence, "remote false must not clear local true");
        assert_eq!(merged.confidence, 0.9);
        assert_eq!(merged.provider, "Local Analysis + Remote");
        assert_eq!(merged.flagged_words, local.flagged_words);
        assert_eq!(merged.suggestions.len(), local.suggestions.len() + 1);
        assert_eq!(merged.suggestions.last().unwrap(), "remote says");
    }

    #[test]
    fn test_merge_remote_flag_sets_category() {
        let local = LocalKeywordAnalyzer::default().analyze("a friendly poem");
        let merged = merge(&local, &remote_hate(true));

        assert!(merged.flagged);
        assert!(merged.categories.hate);
        // Risk level stays the local bucket.
        assert_eq!(merged.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let (failing, _) = MockProvider::failing("broken");
        let pipeline = pipeline(Vec::new());
        let text = "kill and bomb and attack";

        let mut fallback = pipeline.remote_or_local(&failing, text).await;
        let direct = pipeline.local.analyze(text);
        // Only the clock reading differs between the two calls.
        fallback.timestamp = direct.timestamp;

        assert_eq!(fallback, direct);
        assert_eq!(
            serde_json::to_string(&fallback).unwrap(),
            serde_json::to_string(&direct).unwrap()
        );
    }

    #[tokio::test]
    async fn test_no_remotes_returns_local() {
        let pipeline = pipeline(Vec::new());
        let result = pipeline.analyze("Write a friendly poem").await;
        assert_eq!(result.provider, "Local Analysis");
        assert!(!result.flagged);
    }

    #[tokio::test]
    async fn test_error_moves_to_next_provider() {
        let (broken, broken_calls) = MockProvider::failing("broken");
        let (second, second_calls) = MockProvider::ok("second", remote_hate(true));
        let pipeline = pipeline(vec![Box::new(broken), Box::new(second)]);

        let result = pipeline.analyze("hello there").await;

        assert_eq!(broken_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert!(result.flagged);
        assert_eq!(result.provider, "Local Analysis + Remote");
    }

    #[tokio::test]
    async fn test_unflagged_answer_ends_the_chain() {
        let (first, first_calls) = MockProvider::ok("first", remote_hate(false));
        let (second, second_calls) = MockProvider::ok("second", remote_hate(true));
        let pipeline = pipeline(vec![Box::new(first), Box::new(second)]);

        let result = pipeline.analyze("hello there").await;

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert!(!result.flagged);
    }

    #[tokio::test]
    async fn test_all_remotes_failing_returns_local() {
        let (a, _) = MockProvider::failing("a");
        let (b, _) = MockProvider::failing("b");
        let pipeline = pipeline(vec![Box::new(a), Box::new(b)]);
        assert_eq!(pipeline.remote_names(), vec!["a", "b"]);

        let result = pipeline.analyze("this is hate speech").await;
        assert_eq!(result.provider, "Local Analysis");
        assert!(result.categories.hate);
    }
}
