//! Fact categories and the classifiers that assign them.

use serde::{Deserialize, Deserializer, Serialize};

/// Coarse category of a remembered fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Likes, dislikes, favourites. Gets a relevance boost.
    Preference,

    /// Who the user is: name, age, where they live.
    Profile,

    /// Things the user is building or working on.
    Project,

    /// Anything else.
    Misc,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Preference => "preference",
            Category::Profile => "profile",
            Category::Project => "project",
            Category::Misc => "misc",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preference" => Ok(Category::Preference),
            "profile" => Ok(Category::Profile),
            "project" => Ok(Category::Project),
            "misc" => Ok(Category::Misc),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

// Unknown categories written by other tools read back as `Misc` instead of dropping the line.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Category::Misc))
    }
}

/// Assigns a category to fact text at creation time.
pub trait FactClassifier {
    fn classify(&self, text: &str) -> Category;
}

impl<F> FactClassifier for F
where
    F: Fn(&str) -> Category,
{
    fn classify(&self, text: &str) -> Category {
        self(text)
    }
}

/// The default classifier: first matching keyword list wins.
///
/// Checked in order preference, project, profile. Keywords match whole words or phrases;
/// punctuation other than apostrophes counts as a word break.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<(Category, Vec<String>)>,
}

impl KeywordClassifier {
    pub fn new(rules: Vec<(Category, Vec<String>)>) -> Self {
        Self { rules }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        let list = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self::new(vec![
            (
                Category::Preference,
                list(&[
                    "like", "love", "prefer", "favorite", "favourite", "enjoy", "hate", "dislike",
                ]),
            ),
            (
                Category::Project,
                list(&[
                    "project", "build", "building", "robot", "droid", "code", "servo",
                    "working on",
                ]),
            ),
            (
                Category::Profile,
                list(&[
                    "my name", "call me", "i am", "i'm", "years old", "i live", "birthday",
                    "born",
                ]),
            ),
        ])
    }
}

impl FactClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Category {
        let words: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
            .collect();
        let padded = format!(" {} ", words.split_whitespace().collect::<Vec<_>>().join(" "));

        self.rules
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| padded.contains(&format!(" {keyword} ")))
            })
            .map(|(category, _)| *category)
            .unwrap_or(Category::Misc)
    }
}
