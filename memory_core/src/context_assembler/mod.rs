//! Context Assembler - picks relevant facts and builds the prompt for the model.
//!
//! Relevance selection works as follows:
//! 1. **Tokenize**: Split the query on non-alphanumerics, lowercase, drop short tokens and stop words
//! 2. **Score**: Count the tokens each fact shares with the query
//! 3. **Boost**: Preference facts that already overlap get a fixed bonus
//! 4. **Rank**: Sort by score, ties to the most recently remembered fact
//! 5. **Fallback**: Fill any remaining slots with the most recent facts not yet chosen
//! 6. **Assembly**: Render persona, facts, history and the user line into one prompt

mod scoring;

pub use scoring::*;

use k14t_rules::{PersonaInjection, SessionState, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::knowledge_base::{Fact, FactStore};

/// Bonus added to a preference fact's score, only when it already overlaps the query.
pub const PREFERENCE_BOOST: u32 = 1;

/// Configuration for relevance selection.
#[derive(Debug, Clone)]
pub struct RelevanceConfig {
    /// Tokens shorter than this are ignored on both sides.
    pub min_token_len: usize,

    /// Words removed from the query before scoring.
    pub stop_words: HashSet<String>,

    /// Bonus for overlapping preference facts.
    pub preference_boost: u32,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            min_token_len: MIN_TOKEN_LEN,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            preference_boost: PREFERENCE_BOOST,
        }
    }
}

impl RelevanceConfig {
    /// Length filter only, no stop words and no boost.
    pub fn plain() -> Self {
        Self {
            stop_words: HashSet::new(),
            preference_boost: 0,
            ..Self::default()
        }
    }
}

/// Score every fact against the query.
///
/// `facts` must be in log order; the index is the recency key.
pub fn score_facts(facts: &[Fact], query: &str, config: &RelevanceConfig) -> RelevanceScores {
    let query = query_tokens(query, config.min_token_len, &config.stop_words);
    let mut scores = RelevanceScores::new();
    if query.is_empty() {
        return scores;
    }

    for (position, fact) in facts.iter().enumerate() {
        let shared = overlap(&query, &tokenize(&fact.text, config.min_token_len));
        if shared == 0 {
            continue;
        }
        scores.add_score(position, shared);
        if fact.is_preference() {
            scores.add_score(position, config.preference_boost);
        }
    }
    scores
}

/// Pick up to `k` facts for the query, most relevant first.
///
/// Facts with no overlap only appear as recency fallback, newest first, after every
/// overlapping fact.
pub fn select_relevant<'a>(
    facts: &'a [Fact],
    query: &str,
    k: usize,
    config: &RelevanceConfig,
) -> Vec<&'a Fact> {
    if k == 0 {
        return Vec::new();
    }

    let mut chosen: Vec<usize> = score_facts(facts, query, config)
        .ranked()
        .into_iter()
        .take(k)
        .map(|(position, _)| position)
        .collect();

    if chosen.len() < k {
        let already: HashSet<usize> = chosen.iter().copied().collect();
        let fill = k - chosen.len();
        chosen.extend(
            (0..facts.len())
                .rev()
                .filter(|position| !already.contains(position))
                .take(fill),
        );
    }

    chosen.into_iter().map(|position| &facts[position]).collect()
}

/// Builds prompts from memory, session history and the user's line.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    /// Facts injected per prompt.
    max_facts: usize,
}

impl ContextAssembler {
    pub fn new(max_facts: usize) -> Self {
        Self { max_facts }
    }

    /// Assemble the prompt for one user turn.
    pub fn assemble(
        &self,
        store: &FactStore,
        session: &SessionState,
        user_text: &str,
        callsign: &str,
        persona: Option<String>,
    ) -> AssembledPrompt {
        let relevant_facts = store
            .select_relevant(user_text, self.max_facts)
            .into_iter()
            .map(|fact| fact.text.clone())
            .collect();

        AssembledPrompt {
            persona,
            relevant_facts,
            history: session.history().cloned().collect(),
            callsign: callsign.to_string(),
            user_text: user_text.to_string(),
        }
    }
}

/// Resolve which persona text goes into the prompt.
///
/// Without a full persona the micro persona stands in for it.
pub fn persona_text(
    injection: PersonaInjection,
    full_persona: Option<&str>,
    micro_persona: &str,
) -> Option<String> {
    let micro = (!micro_persona.trim().is_empty()).then(|| micro_persona.trim().to_string());
    match injection {
        PersonaInjection::Full => full_persona.map(str::to_string).or(micro),
        PersonaInjection::Micro => micro,
        PersonaInjection::Omit => None,
    }
}

/// The assembled prompt, before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledPrompt {
    /// Persona text, if this turn carries one.
    pub persona: Option<String>,

    /// Remembered facts, in relevance order.
    pub relevant_facts: Vec<String>,

    /// Recent conversation, oldest first.
    pub history: Vec<Turn>,

    pub callsign: String,
    pub user_text: String,
}

impl AssembledPrompt {
    /// Format as the prompt string sent to the model.
    pub fn to_prompt_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(persona) = self.persona.as_deref().filter(|p| !p.trim().is_empty()) {
            parts.push(persona.trim().to_string());
        }

        if !self.relevant_facts.is_empty() {
            parts.push(format!("[MEM: {}]", self.relevant_facts.join("; ")));
        }

        for turn in &self.history {
            parts.push(format!("{}: {}", turn.speaker, turn.text));
        }

        parts.push(format!("User ({}): {}", self.callsign, self.user_text));
        parts.push("K-14T:".to_string());

        parts.join("\n")
    }

    /// Rough prompt size in whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.to_prompt_string().split_whitespace().count()
    }
}
