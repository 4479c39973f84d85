//! Fact definitions - the entries of the memory log.

use serde::{Deserialize, Serialize};

use super::Category;

/// A fact is a short statement remembered across sessions.
///
/// Serialised as one line of the memory log: `{"ts": 1700000000.5, "fact": "I like tea"}`,
/// plus `category` and `score` when present. Older logs used `text` instead of `fact`;
/// when both keys are present, `fact` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FactLine")]
pub struct Fact {
    /// When this fact was remembered, in epoch seconds.
    #[serde(rename = "ts")]
    pub timestamp: f64,

    /// The remembered text, verbatim.
    #[serde(rename = "fact")]
    pub text: String,

    /// Category assigned when the fact was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Unused by retrieval; carried through so older or newer logs round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A log line as written, before choosing between `fact` and `text`.
#[derive(Deserialize)]
struct FactLine {
    ts: f64,
    #[serde(default)]
    fact: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    score: Option<f64>,
}

impl TryFrom<FactLine> for Fact {
    type Error = String;

    fn try_from(line: FactLine) -> Result<Self, Self::Error> {
        let text = match (line.fact, line.text) {
            (Some(fact), _) if !fact.is_empty() => fact,
            (_, Some(text)) => text,
            (Some(fact), None) => fact,
            (None, None) => return Err("missing field `fact`".to_string()),
        };

        Ok(Self {
            timestamp: line.ts,
            text,
            category: line.category,
            score: line.score,
        })
    }
}

impl Fact {
    /// Create a new uncategorised fact with the given text.
    pub fn new(text: impl Into<String>, timestamp: f64) -> Self {
        Self {
            timestamp,
            text: text.into(),
            category: None,
            score: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// The duplicate-detection key for this fact.
    pub fn normalized(&self) -> String {
        normalize(&self.text)
    }

    /// Check whether this fact was tagged as a preference.
    pub fn is_preference(&self) -> bool {
        self.category == Some(Category::Preference)
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Lowercase and collapse whitespace runs to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  I  LIKE\tTea \n"), "i like tea");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_fact_builder() {
        let fact = Fact::new("I like tea", 10.0).with_category(Category::Preference);
        assert_eq!(fact.text, "I like tea");
        assert!(fact.is_preference());
        assert_eq!(fact.normalized(), "i like tea");
    }

    #[test]
    fn test_log_line_shape() {
        let fact = Fact::new("I like tea", 1.5).with_category(Category::Preference);
        let line = serde_json::to_string(&fact).unwrap();
        assert_eq!(line, r#"{"ts":1.5,"fact":"I like tea","category":"preference"}"#);

        let bare = serde_json::to_string(&Fact::new("x", 2.0)).unwrap();
        assert_eq!(bare, r#"{"ts":2.0,"fact":"x"}"#);
    }

    #[test]
    fn test_parse_legacy_and_extended_lines() {
        let legacy: Fact = serde_json::from_str(r#"{"ts": 3, "text": "old style"}"#).unwrap();
        assert_eq!(legacy.text, "old style");
        assert_eq!(legacy.timestamp, 3.0);
        assert_eq!(legacy.category, None);

        let extended: Fact =
            serde_json::from_str(r#"{"ts": 4.0, "fact": "f", "category": "misc", "score": 0.7}"#)
                .unwrap();
        assert_eq!(extended.category, Some(Category::Misc));
        assert_eq!(extended.score, Some(0.7));
    }

    #[test]
    fn test_parse_line_with_both_keys() {
        let both: Fact =
            serde_json::from_str(r#"{"ts": 1, "fact": "new key", "text": "old key"}"#).unwrap();
        assert_eq!(both.text, "new key");

        let empty_fact: Fact =
            serde_json::from_str(r#"{"ts": 1, "fact": "", "text": "old key"}"#).unwrap();
        assert_eq!(empty_fact.text, "old key");

        assert!(serde_json::from_str::<Fact>(r#"{"ts": 1}"#).is_err());
    }
}
