// Moderation domain models - data structures for the content moderation pipeline.
//
// These are pure domain types with no HTTP dependencies.
// The web layer serializes them straight into responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content-policy dimension. Declared order is the iteration order
/// everywhere (suggestions, flagged words, alert summaries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hate,
    Violence,
    Harassment,
    SelfHarm,
    Sexual,
    Illegal,
}

impl Category {
    /// Every category, in declared order.
    pub const ALL: [Category; 6] = [
        Category::Hate,
        Category::Violence,
        Category::Harassment,
        Category::SelfHarm,
        Category::Sexual,
        Category::Illegal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hate => "hate",
            Category::Violence => "violence",
            Category::Harassment => "harassment",
            Category::SelfHarm => "self_harm",
            Category::Sexual => "sexual",
            Category::Illegal => "illegal",
        }
    }

    /// The advisory shown to the author when this category is triggered.
    pub fn advisory(&self) -> &'static str {
        match self {
            Category::Hate => "Consider using more inclusive and respectful language",
            Category::Violence => {
                "⚠️ WARNING: Content contains violent language - avoid references to harm, killing, or violence"
            }
            Category::Harassment => "Ensure content promotes positive interactions",
            Category::SelfHarm => "Content should not promote self-harm or dangerous behaviors",
            Category::Sexual => "Keep content appropriate for all audiences",
            Category::Illegal => "Ensure content complies with legal requirements",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flag per category. Serializes as `{"hate": false, "violence": true, ...}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlags {
    pub hate: bool,
    pub violence: bool,
    pub harassment: bool,
    pub self_harm: bool,
    pub sexual: bool,
    pub illegal: bool,
}

impl CategoryFlags {
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Hate => self.hate,
            Category::Violence => self.violence,
            Category::Harassment => self.harassment,
            Category::SelfHarm => self.self_harm,
            Category::Sexual => self.sexual,
            Category::Illegal => self.illegal,
        }
    }

    pub fn set(&mut self, category: Category, value: bool) {
        let slot = match category {
            Category::Hate => &mut self.hate,
            Category::Violence => &mut self.violence,
            Category::Harassment => &mut self.harassment,
            Category::SelfHarm => &mut self.self_harm,
            Category::Sexual => &mut self.sexual,
            Category::Illegal => &mut self.illegal,
        };
        *slot = value;
    }

    /// `(category, flag)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, bool)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Categories that are set, in declared order.
    pub fn flagged(&self) -> Vec<Category> {
        self.iter().filter(|(_, v)| *v).map(|(c, _)| c).collect()
    }

    /// Per-category logical OR.
    pub fn union(&self, other: &CategoryFlags) -> CategoryFlags {
        let mut merged = CategoryFlags::default();
        for category in Category::ALL {
            merged.set(category, self.get(category) || other.get(category));
        }
        merged
    }

    /// Human-readable summary, e.g. `"violence, illegal"`.
    pub fn summary(&self) -> String {
        let names: Vec<&str> = self.flagged().iter().map(|c| c.as_str()).collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}

/// Coarse severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket derived from the number of distinct matched trigger words.
    pub fn from_match_count(count: usize) -> Self {
        if count >= 3 {
            RiskLevel::High
        } else if count >= 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Bucket used by score-based classifiers.
    pub fn from_score(flagged: bool, score: f64) -> Self {
        if flagged {
            RiskLevel::High
        } else if score > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// The decision produced for one piece of content.
///
/// Created fresh per request. Never stored on its own; it is either returned
/// to the caller or summarized into an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub flagged: bool,
    pub categories: CategoryFlags,
    pub confidence: f64,
    pub provider: String,
    pub flagged_words: Vec<String>,
    pub risk_level: RiskLevel,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_flags_serialize_with_snake_case_keys() {
        let mut flags = CategoryFlags::default();
        flags.set(Category::SelfHarm, true);

        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["self_harm"], true);
        assert_eq!(json["hate"], false);
        assert_eq!(json.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_union_never_clears_a_set_flag() {
        let mut local = CategoryFlags::default();
        local.set(Category::Violence, true);
        let mut remote = CategoryFlags::default();
        remote.set(Category::Hate, true);

        let merged = local.union(&remote);
        assert_eq!(merged.flagged(), vec![Category::Hate, Category::Violence]);
    }

    #[test]
    fn test_summary_lists_flagged_in_declared_order() {
        let mut flags = CategoryFlags::default();
        flags.set(Category::Illegal, true);
        flags.set(Category::Violence, true);
        assert_eq!(flags.summary(), "violence, illegal");
        assert_eq!(CategoryFlags::default().summary(), "none");
    }

    #[test]
    fn test_risk_level_buckets() {
        assert_eq!(RiskLevel::from_match_count(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_match_count(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_match_count(3), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(false, 0.31), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(false, 0.3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(true, 0.0), RiskLevel::High);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ModerationResult {
            flagged: false,
            categories: CategoryFlags::default(),
            confidence: 0.95,
            provider: "Local Analysis".to_string(),
            flagged_words: vec![],
            risk_level: RiskLevel::Low,
            suggestions: vec![],
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["riskLevel"], "low");
        assert!(json["flaggedWords"].is_array());
        assert!(json["timestamp"].is_string());
    }
}
