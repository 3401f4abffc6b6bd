// Local keyword analyzer - the provider that never fails.
//
// Matching is plain substring containment on a lowercased copy of the text.
// "cut" matches "shortcut" and "war" matches "software"; that is the policy.

use super::moderation_models::{Category, CategoryFlags, ModerationResult, RiskLevel};
use chrono::Utc;
use std::sync::Arc;

pub const LOCAL_PROVIDER: &str = "Local Analysis";
pub const SAFE_SUGGESTION: &str = "Content appears safe and appropriate";

const FLAGGED_CONFIDENCE: f64 = 0.9;
const CLEAN_CONFIDENCE: f64 = 0.95;

const HATE: &[&str] = &[
    "hate",
    "racist",
    "discrimination",
    "bigot",
    "supremacist",
    "nazi",
    "fascist",
];
const VIOLENCE: &[&str] = &[
    "kill",
    "killing",
    "murder",
    "attack",
    "weapon",
    "bomb",
    "shoot",
    "shooting",
    "stab",
    "stabbing",
    "beat",
    "beating",
    "hurt",
    "harm",
    "violence",
    "violent",
    "assault",
    "fight",
    "fighting",
    "war",
    "battle",
    "destroy",
    "destruction",
];
const HARASSMENT: &[&str] = &[
    "harassment",
    "bully",
    "bullying",
    "stalk",
    "stalking",
    "threaten",
    "threatening",
    "intimidate",
    "intimidation",
    "abuse",
    "abusive",
];
const SELF_HARM: &[&str] = &[
    "self-harm",
    "suicide",
    "kill myself",
    "end my life",
    "cut",
    "cutting",
    "overdose",
    "overdosing",
    "die",
    "death",
    "dead",
];
const SEXUAL: &[&str] = &[
    "sexual",
    "porn",
    "pornography",
    "explicit",
    "adult content",
    "nsfw",
    "nude",
    "nudity",
    "sex",
    "sexy",
];
const ILLEGAL: &[&str] = &[
    "illegal",
    "drugs",
    "steal",
    "stealing",
    "fraud",
    "terrorism",
    "terrorist",
    "bomb",
    "bombing",
    "hack",
    "hacking",
    "rob",
    "robbing",
];

/// Trigger substrings per category. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    triggers: Vec<(Category, Vec<String>)>,
}

impl KeywordTable {
    /// The built-in trigger lists.
    pub fn builtin() -> Self {
        Self::from_lists(|category| match category {
            Category::Hate => HATE,
            Category::Violence => VIOLENCE,
            Category::Harassment => HARASSMENT,
            Category::SelfHarm => SELF_HARM,
            Category::Sexual => SEXUAL,
            Category::Illegal => ILLEGAL,
        })
    }

    /// Build a table from a per-category word list. Words are lowercased.
    pub fn from_lists<'a>(lists: impl Fn(Category) -> &'a [&'a str]) -> Self {
        let triggers = Category::ALL
            .iter()
            .map(|category| {
                let words = lists(*category)
                    .iter()
                    .map(|w| w.to_lowercase())
                    .collect();
                (*category, words)
            })
            .collect();
        Self { triggers }
    }

    /// `(category, triggers)` in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.triggers.iter().map(|(c, w)| (*c, w.as_slice()))
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Scans text against a [`KeywordTable`].
#[derive(Debug, Clone)]
pub struct LocalKeywordAnalyzer {
    table: Arc<KeywordTable>,
}

impl LocalKeywordAnalyzer {
    pub fn new(table: Arc<KeywordTable>) -> Self {
        Self { table }
    }

    /// Analyze text. Pure apart from reading the clock for the timestamp.
    pub fn analyze(&self, content: &str) -> ModerationResult {
        let lower = content.to_lowercase();
        let mut categories = CategoryFlags::default();
        let mut flagged_words: Vec<String> = Vec::new();
        // Per-category hits; a trigger shared by two categories counts twice.
        let mut match_count = 0;

        for (category, words) in self.table.iter() {
            let mut hit = false;
            for word in words.iter().filter(|w| lower.contains(w.as_str())) {
                hit = true;
                match_count += 1;
                if !flagged_words.contains(word) {
                    flagged_words.push(word.clone());
                }
            }
            categories.set(category, hit);
        }

        let flagged = !flagged_words.is_empty();
        let mut suggestions: Vec<String> = categories
            .flagged()
            .iter()
            .map(|c| c.advisory().to_string())
            .collect();
        if !flagged {
            suggestions.push(SAFE_SUGGESTION.to_string());
        }

        ModerationResult {
            flagged,
            categories,
            confidence: if flagged {
                FLAGGED_CONFIDENCE
            } else {
                CLEAN_CONFIDENCE
            },
            provider: LOCAL_PROVIDER.to_string(),
            risk_level: RiskLevel::from_match_count(match_count),
            flagged_words,
            suggestions,
            timestamp: Utc::now(),
        }
    }
}

impl Default for LocalKeywordAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(KeywordTable::builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> LocalKeywordAnalyzer {
        LocalKeywordAnalyzer::default()
    }

    #[test]
    fn test_clean_text_is_low_risk() {
        for text in ["Write a friendly poem", "Summarize this article", ""] {
            let result = analyzer().analyze(text);
            assert!(!result.flagged, "{text:?} should pass");
            assert_eq!(result.risk_level, RiskLevel::Low);
            assert_eq!(result.confidence, 0.95);
            assert!(result.flagged_words.is_empty());
            assert_eq!(result.suggestions, vec![SAFE_SUGGESTION.to_string()]);
        }
    }

    #[test]
    fn test_single_category_is_medium_risk() {
        let result = analyzer().analyze("this is hate speech");

        assert!(result.flagged);
        assert!(result.categories.hate);
        assert_eq!(result.categories.flagged(), vec![Category::Hate]);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.flagged_words, vec!["hate".to_string()]);
        assert_eq!(
            result.suggestions,
            vec![Category::Hate.advisory().to_string()]
        );
    }

    #[test]
    fn test_three_distinct_words_is_high_risk() {
        let result = analyzer().analyze("kill and bomb and attack");

        assert!(result.flagged);
        assert!(result.categories.violence);
        // "bomb" is also an illegal trigger
        assert!(result.categories.illegal);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_flagged_words_are_deduplicated() {
        let result = analyzer().analyze("kill kill murder");
        assert_eq!(
            result.flagged_words,
            vec!["kill".to_string(), "murder".to_string()]
        );

        // Shared trigger across categories is listed once.
        let result = analyzer().analyze("a bomb");
        assert_eq!(result.flagged_words, vec!["bomb".to_string()]);
        assert!(result.categories.violence && result.categories.illegal);
    }

    #[test]
    fn test_shared_trigger_counts_once_per_category() {
        // kill (violence) + bomb (violence) + bomb (illegal)
        let result = analyzer().analyze("kill the bomb");

        assert_eq!(
            result.flagged_words,
            vec!["kill".to_string(), "bomb".to_string()]
        );
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let result = analyzer().analyze("The SHORTCUT menu");
        assert!(result.categories.self_harm);
        assert_eq!(result.flagged_words, vec!["cut".to_string()]);
    }

    #[test]
    fn test_suggestions_follow_declared_order() {
        let result = analyzer().analyze("drugs and nsfw and racist");
        assert_eq!(
            result.suggestions,
            vec![
                Category::Hate.advisory().to_string(),
                Category::Sexual.advisory().to_string(),
                Category::Illegal.advisory().to_string(),
            ]
        );
    }

    #[test]
    fn test_custom_table() {
        const PIRACY: &[&str] = &["Piracy"];
        let table = KeywordTable::from_lists(|c| match c {
            Category::Illegal => PIRACY,
            _ => &[] as &[&str],
        });

        let analyzer = LocalKeywordAnalyzer::new(Arc::new(table));
        let result = analyzer.analyze("software piracy tips");
        assert!(result.flagged);
        assert_eq!(result.categories.flagged(), vec![Category::Illegal]);
    }
}
