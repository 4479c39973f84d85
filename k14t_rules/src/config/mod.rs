//! Loop configuration, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "k14t.toml";

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Everything the chat loop can be tuned with.
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Model name passed to the inference server.
    pub model: String,

    /// Base URL of the inference server.
    pub endpoint: String,

    /// How the user is addressed in prompts.
    pub callsign: String,

    /// Number of user/assistant exchanges kept as history.
    pub history_turns: usize,

    /// Output token cap per reply.
    pub num_predict: u32,

    /// Output token cap while fast mode is on.
    pub fast_num_predict: u32,

    pub temperature: f32,
    pub top_p: f32,

    /// Speak replies through `voice_command`.
    pub voice: bool,

    /// Ring the terminal bell before each reply.
    pub beeps: bool,

    /// External program that receives the reply text as its only argument.
    pub voice_command: String,

    /// Full persona, injected once per session.
    pub persona_path: PathBuf,

    /// One-line persona used after the first turn.
    pub micro_persona: String,

    /// Inject the micro persona on every turn after the first.
    pub inject_micro_always: bool,

    /// When `inject_micro_always` is off, inject the micro persona every N user turns (0 = never).
    pub reminder_interval: u32,

    /// Line-delimited JSON log of remembered facts.
    pub memory_path: PathBuf,

    /// Facts injected into each prompt.
    pub memory_max_injected: usize,

    /// Prune the oldest facts once the store grows past this many.
    pub memory_max_facts: Option<usize>,

    /// Remember facts detected in ordinary chat input.
    pub auto_remember: bool,

    /// How long to wait for the inference server at startup.
    pub server_wait_secs: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            model: "phi:latest".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            callsign: "Joshua".to_string(),
            history_turns: 2,
            num_predict: 60,
            fast_num_predict: 40,
            temperature: 0.6,
            top_p: 0.9,
            voice: false,
            beeps: false,
            voice_command: "espeak".to_string(),
            persona_path: PathBuf::from("persona/system_prompt.txt"),
            micro_persona: "K-14T stays in-universe, concise (two short sentences at most), no meta or AI talk."
                .to_string(),
            inject_micro_always: true,
            reminder_interval: 4,
            memory_path: PathBuf::from("memory/long_term.jsonl"),
            memory_max_injected: 3,
            memory_max_facts: None,
            auto_remember: true,
            server_wait_secs: 45,
        }
    }
}

impl LoopConfig {
    /// Load the configuration from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file is an error.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration, falling back to defaults if the file is bad.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "bad config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration to `path`.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Output token cap for the current mode.
    pub fn num_predict_for(&self, fast_mode: bool) -> u32 {
        if fast_mode {
            self.fast_num_predict
        } else {
            self.num_predict
        }
    }

    /// Read the full persona text, if the file exists and is non-empty.
    pub fn load_persona(&self) -> Option<String> {
        match std::fs::read_to_string(&self.persona_path) {
            Ok(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    path = %self.persona_path.display(),
                    "persona file missing; only the micro persona will be used"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoopConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LoopConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k14t.toml");
        std::fs::write(&path, "model = \"llama3\"\nmemory_max_facts = 100\n").unwrap();

        let config = LoopConfig::load(&path).unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.memory_max_facts, Some(100));
        assert_eq!(config.callsign, "Joshua");
        assert_eq!(config.history_turns, 2);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k14t.toml");
        std::fs::write(&path, "model = [unterminated").unwrap();

        assert!(matches!(
            LoopConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(LoopConfig::load_or_default(&path), LoopConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k14t.toml");

        let mut config = LoopConfig::default();
        config.callsign = "Rey".to_string();
        config.voice = true;
        config.save(&path).unwrap();

        let loaded = LoopConfig::load(&path).unwrap();
        assert_eq!(loaded.callsign, "Rey");
        assert!(loaded.voice);
    }

    #[test]
    fn test_num_predict_for_mode() {
        let config = LoopConfig::default();
        assert_eq!(config.num_predict_for(false), 60);
        assert_eq!(config.num_predict_for(true), 40);
    }

    #[test]
    fn test_load_persona() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LoopConfig::default();
        config.persona_path = dir.path().join("system_prompt.txt");
        assert_eq!(config.load_persona(), None);

        std::fs::write(&config.persona_path, "  You are K-14T.\n").unwrap();
        assert_eq!(config.load_persona().as_deref(), Some("You are K-14T."));
    }
}
