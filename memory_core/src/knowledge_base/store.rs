//! Fact Store - the in-memory index over the memory log.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{normalize, Fact, FactClassifier, FactLog, KeywordClassifier, StoreResult};
use crate::context_assembler::{select_relevant, RelevanceConfig};

/// Result of asking the store to remember something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new fact was written to the log.
    Stored,
    /// An equal fact (ignoring case and whitespace) already exists; nothing was written.
    Duplicate,
    /// The text was blank; nothing was written.
    Empty,
}

/// Tuning for a [`FactStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Keep at most this many facts, dropping the oldest.
    pub max_facts: Option<usize>,

    pub relevance: RelevanceConfig,
}

/// The fact store owns the memory log and a cache of its contents.
///
/// Every mutation writes the log first and only then touches the cache, so a failed
/// write leaves the cache as it was. Positions used by [`FactStore::delete_by_position`]
/// index the full chronological list, the same order [`FactStore::list_recent`] returns.
pub struct FactStore {
    log: FactLog,

    /// Facts in log order, oldest first.
    facts: Vec<Fact>,

    /// Normalized text of every cached fact.
    normalized: HashSet<String>,

    classifier: Box<dyn FactClassifier>,
    config: StoreConfig,
}

impl std::fmt::Debug for FactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactStore")
            .field("path", &self.log.path())
            .field("facts", &self.facts.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FactStore {
    /// Open the store at `path` with default settings.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with(path, StoreConfig::default())
    }

    /// Open the store at `path`, loading whatever the log holds.
    ///
    /// Unreadable lines and later duplicates of an earlier fact are skipped.
    pub fn open_with(path: impl Into<PathBuf>, config: StoreConfig) -> StoreResult<Self> {
        let log = FactLog::open(path)?;
        let loaded = log.read_all()?;

        let mut facts = Vec::with_capacity(loaded.facts.len());
        let mut normalized = HashSet::with_capacity(loaded.facts.len());
        for fact in loaded.facts {
            let key = fact.normalized();
            if key.is_empty() || !normalized.insert(key) {
                tracing::debug!(fact = %fact.text, "skipping blank or duplicate memory line");
                continue;
            }
            facts.push(fact);
        }

        tracing::debug!(
            path = %log.path().display(),
            facts = facts.len(),
            skipped = loaded.skipped_lines,
            "memory loaded"
        );

        Ok(Self {
            log,
            facts,
            normalized,
            classifier: Box::new(KeywordClassifier::default()),
            config,
        })
    }

    /// Replace the classifier used for new facts.
    pub fn with_classifier(mut self, classifier: impl FactClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Check whether an equal fact (ignoring case and whitespace) is stored.
    pub fn contains(&self, text: &str) -> bool {
        self.normalized.contains(&normalize(text))
    }

    /// Remember a fact.
    ///
    /// If the store then holds more than `max_facts`, the oldest facts are dropped and the
    /// log is rewritten in the same step.
    pub fn add(&mut self, text: &str) -> StoreResult<AddOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(AddOutcome::Empty);
        }

        let key = normalize(text);
        if self.normalized.contains(&key) {
            return Ok(AddOutcome::Duplicate);
        }

        // Never step backwards, so log order stays chronological.
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;
        let timestamp = self.facts.last().map_or(now, |last| now.max(last.timestamp));
        let fact = Fact::new(text, timestamp).with_category(self.classifier.classify(text));

        let excess = self
            .config
            .max_facts
            .map_or(0, |max| (self.facts.len() + 1).saturating_sub(max));

        if excess == 0 {
            self.log.append(&fact)?;
            self.facts.push(fact);
            self.normalized.insert(key);
        } else {
            // A cap of zero keeps nothing, not even the new fact.
            let mut kept = self.facts.clone();
            kept.push(fact);
            kept.drain(..excess);

            self.log.rewrite(&kept)?;
            tracing::info!(pruned = excess, "memory pruned to cap");
            self.replace_cache(kept);
        }

        tracing::info!(fact = %text, "fact stored");
        Ok(AddOutcome::Stored)
    }

    /// The last `limit` facts, oldest first.
    pub fn list_recent(&self, limit: usize) -> &[Fact] {
        &self.facts[self.facts.len().saturating_sub(limit)..]
    }

    /// All facts, oldest first.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Delete the fact at `position` in the full chronological list.
    ///
    /// Returns `false` without touching anything when the position is out of range.
    pub fn delete_by_position(&mut self, position: usize) -> StoreResult<bool> {
        if position >= self.facts.len() {
            return Ok(false);
        }

        let mut kept = self.facts.clone();
        let removed = kept.remove(position);
        self.log.rewrite(&kept)?;
        self.replace_cache(kept);

        tracing::info!(fact = %removed.text, position, "fact deleted");
        Ok(true)
    }

    /// Forget everything. Idempotent.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.log.rewrite(&[])?;
        self.replace_cache(Vec::new());
        tracing::info!("memory wiped");
        Ok(())
    }

    /// Up to `k` facts relevant to `query`, most relevant first.
    pub fn select_relevant(&self, query: &str, k: usize) -> Vec<&Fact> {
        select_relevant(&self.facts, query, k, &self.config.relevance)
    }

    fn replace_cache(&mut self, facts: Vec<Fact>) {
        self.normalized = facts.iter().map(Fact::normalized).collect();
        self.facts = facts;
    }
}
