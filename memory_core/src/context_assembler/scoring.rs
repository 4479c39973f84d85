//! Token-overlap scoring for relevance selection.

use std::collections::{HashMap, HashSet};

/// Tokens shorter than this many characters are ignored.
pub const MIN_TOKEN_LEN: usize = 3;

/// Common English words dropped from queries before scoring.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "and", "you", "your", "are", "was", "were", "for", "that", "this", "with", "what",
    "who", "how", "why", "when", "where", "have", "has", "had", "can", "not", "but", "from",
    "they", "them", "about", "into", "just", "does", "did", "will", "would", "there", "their",
    "any", "all",
];

/// Split on non-alphanumeric characters, lowercase, and keep tokens of at least `min_len` chars.
pub fn tokenize(text: &str, min_len: usize) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

/// Tokenize a query: like [`tokenize`], then drop stop words.
pub fn query_tokens(text: &str, min_len: usize, stop_words: &HashSet<String>) -> HashSet<String> {
    let mut tokens = tokenize(text, min_len);
    tokens.retain(|token| !stop_words.contains(token));
    tokens
}

/// Number of tokens the two sets share.
pub fn overlap(query: &HashSet<String>, fact: &HashSet<String>) -> u32 {
    query.intersection(fact).count() as u32
}

/// Relevance scores keyed by log position.
///
/// Position doubles as the recency key: a higher position was remembered later.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScores {
    scores: HashMap<usize, u32>,
}

impl RelevanceScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add score to a position (accumulates with existing score).
    pub fn add_score(&mut self, position: usize, score: u32) {
        *self.scores.entry(position).or_insert(0) += score;
    }

    pub fn get_score(&self, position: usize) -> u32 {
        self.scores.get(&position).copied().unwrap_or(0)
    }

    /// Positions with a nonzero score, best first; ties go to the most recent.
    pub fn ranked(&self) -> Vec<(usize, u32)> {
        let mut ranked: Vec<_> = self
            .scores
            .iter()
            .filter(|(_, score)| **score > 0)
            .map(|(position, score)| (*position, *score))
            .collect();

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Do you like tea?", MIN_TOKEN_LEN),
            set(&["you", "like", "tea"])
        );
        assert_eq!(
            tokenize("servo-arm, SERVO arm!", MIN_TOKEN_LEN),
            set(&["servo", "arm"])
        );
        assert!(tokenize("a b c ok", MIN_TOKEN_LEN).is_empty());
    }

    #[test]
    fn test_query_tokens_drop_stop_words() {
        let stop = set(&["you", "the"]);
        assert_eq!(
            query_tokens("Do you like the tea", MIN_TOKEN_LEN, &stop),
            set(&["like", "tea"])
        );
    }

    #[test]
    fn test_overlap() {
        let query = set(&["servo", "project", "details"]);
        let fact = set(&["project", "uses", "servo"]);
        assert_eq!(overlap(&query, &fact), 2);
        assert_eq!(overlap(&query, &set(&["tea"])), 0);
    }

    #[test]
    fn test_ranked_orders_by_score_then_recency() {
        let mut scores = RelevanceScores::new();
        scores.add_score(0, 2);
        scores.add_score(1, 1);
        scores.add_score(2, 2);
        scores.add_score(3, 0);

        assert_eq!(scores.ranked(), vec![(2, 2), (0, 2), (1, 1)]);
    }

    #[test]
    fn test_score_accumulation() {
        let mut scores = RelevanceScores::new();
        scores.add_score(4, 1);
        scores.add_score(4, 1);
        assert_eq!(scores.get_score(4), 2);
    }
}
