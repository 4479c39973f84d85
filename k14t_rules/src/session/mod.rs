//! Session state - what the loop remembers between turns of one run.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who said a line of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when rendering history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "K-14T",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One line of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Which persona text, if any, goes into the next prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaInjection {
    Full,
    Micro,
    Omit,
}

/// When the micro persona is re-injected after the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// Inject on every turn after the first.
    pub always: bool,

    /// Otherwise inject every N user turns (0 = never).
    pub interval: u32,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            always: true,
            interval: 4,
        }
    }
}

/// Mutable state of one chat session.
#[derive(Debug, Clone)]
pub struct SessionState {
    history: VecDeque<Turn>,
    max_exchanges: usize,

    /// Shorter replies, voice muted.
    pub fast_mode: bool,

    first_turn: bool,
    user_turns: u32,
}

impl SessionState {
    /// Create a session that keeps the last `max_exchanges` user/assistant pairs.
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_exchanges * 2),
            max_exchanges,
            fast_mode: false,
            first_turn: true,
            user_turns: 0,
        }
    }

    /// Decide the persona for the turn about to be sent, and advance the turn counter.
    pub fn persona_for_turn(&mut self, policy: ReminderPolicy) -> PersonaInjection {
        self.user_turns += 1;

        if self.first_turn {
            self.first_turn = false;
            return PersonaInjection::Full;
        }

        if policy.always || (policy.interval > 0 && self.user_turns % policy.interval == 0) {
            PersonaInjection::Micro
        } else {
            PersonaInjection::Omit
        }
    }

    /// Inject the full persona again on the next turn.
    pub fn reset_persona(&mut self) {
        self.first_turn = true;
    }

    /// Record a completed exchange, dropping the oldest beyond the window.
    pub fn record_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        if self.max_exchanges == 0 {
            return;
        }
        self.history.push_back(Turn::new(Speaker::User, user));
        self.history.push_back(Turn::new(Speaker::Assistant, reply));
        while self.history.len() > self.max_exchanges * 2 {
            self.history.pop_front();
        }
    }

    /// History in chronological order.
    pub fn history(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter()
    }

    /// Number of user turns sent so far.
    pub fn user_turns(&self) -> u32 {
        self.user_turns
    }

    pub fn toggle_fast(&mut self) -> bool {
        self.fast_mode = !self.fast_mode;
        self.fast_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_gets_full_persona() {
        let mut session = SessionState::new(2);
        let policy = ReminderPolicy::default();

        assert_eq!(session.persona_for_turn(policy), PersonaInjection::Full);
        assert_eq!(session.persona_for_turn(policy), PersonaInjection::Micro);
        assert_eq!(session.user_turns(), 2);
    }

    #[test]
    fn test_reminder_interval() {
        let mut session = SessionState::new(2);
        let policy = ReminderPolicy {
            always: false,
            interval: 3,
        };

        let injections: Vec<_> = (0..6).map(|_| session.persona_for_turn(policy)).collect();
        assert_eq!(
            injections,
            vec![
                PersonaInjection::Full,
                PersonaInjection::Omit,
                PersonaInjection::Micro,
                PersonaInjection::Omit,
                PersonaInjection::Omit,
                PersonaInjection::Micro,
            ]
        );
    }

    #[test]
    fn test_reset_persona() {
        let mut session = SessionState::new(2);
        let policy = ReminderPolicy::default();

        session.persona_for_turn(policy);
        session.reset_persona();
        assert_eq!(session.persona_for_turn(policy), PersonaInjection::Full);
    }

    #[test]
    fn test_history_window() {
        let mut session = SessionState::new(2);
        session.record_exchange("one", "1");
        session.record_exchange("two", "2");
        session.record_exchange("three", "3");

        let texts: Vec<_> = session.history().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "2", "three", "3"]);
        assert_eq!(session.history().next().unwrap().speaker, Speaker::User);
    }

    #[test]
    fn test_zero_history() {
        let mut session = SessionState::new(0);
        session.record_exchange("hello", "hi");
        assert_eq!(session.history().count(), 0);
    }

    #[test]
    fn test_toggle_fast() {
        let mut session = SessionState::new(1);
        assert!(session.toggle_fast());
        assert!(!session.toggle_fast());
    }
}
