//! The interactive chat loop.

use anyhow::Result;
use k14t_rules::{shape_reply, Command, LoopConfig, ReminderPolicy, SessionState};
use memory_core::{detect_fact, persona_text, AddOutcome, ContextAssembler, FactStore};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::ollama::{GenerateOptions, ReplyModel};
use crate::voice::Voice;

/// Facts shown by `/mem`.
const MEM_LISTING: usize = 25;

/// Sentences kept from each reply.
const MAX_REPLY_SENTENCES: usize = 2;

enum Flow {
    Continue,
    Exit,
}

/// One interactive session: memory, history and the model, driven line by line.
pub struct ChatLoop<M: ReplyModel> {
    config: LoopConfig,
    config_path: PathBuf,
    model_override: Option<String>,
    store: FactStore,
    session: SessionState,
    assembler: ContextAssembler,
    persona: Option<String>,
    model: M,
    voice: Voice,
}

impl<M: ReplyModel> ChatLoop<M> {
    pub fn new(
        mut config: LoopConfig,
        config_path: PathBuf,
        model_override: Option<String>,
        store: FactStore,
        model: M,
    ) -> Self {
        if let Some(name) = &model_override {
            config.model = name.clone();
        }

        Self {
            session: SessionState::new(config.history_turns),
            assembler: ContextAssembler::new(config.memory_max_injected),
            persona: config.load_persona(),
            voice: Voice::new(config.voice_command.clone()),
            config,
            config_path,
            model_override,
            store,
            model,
        }
    }

    /// Read lines from `input` until it ends or the user exits.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(out, "K-14T loop online. Model: {}", self.config.model)?;
        writeln!(out, "{}", Command::help())?;

        for line in input.split(b'\n') {
            // A stray invalid byte must not end the session.
            let line = String::from_utf8_lossy(&line?).into_owned();
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            if let Flow::Exit = self.handle(command, out)? {
                break;
            }
        }

        writeln!(out, "K-14T: Shutdown sequence, {}.", self.config.callsign)?;
        Ok(())
    }

    fn handle(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Model(Some(name)) => {
                self.config.model = name.clone();
                self.model_override = None;
                self.save_config();
                writeln!(out, "[INFO] Model -> {name}")?;
            }
            Command::Model(None) => writeln!(out, "Usage: /model <name>")?,
            Command::Callsign(Some(name)) => {
                self.config.callsign = name.clone();
                self.save_config();
                writeln!(out, "[INFO] Callsign -> {name}")?;
            }
            Command::Callsign(None) => writeln!(out, "Usage: /callsign <name>")?,
            Command::Remember(Some(text)) => self.remember(&text, out)?,
            Command::Remember(None) => writeln!(out, "Usage: /remember <fact>")?,
            Command::Mem => self.list_memory(out)?,
            Command::Forget(Some(position)) => match self.store.delete_by_position(position) {
                Ok(true) => writeln!(out, "[MEM] Deleted.")?,
                Ok(false) => writeln!(out, "[MEM] Bad index.")?,
                Err(e) => {
                    warn!(error = %e, "delete failed");
                    writeln!(out, "[MEM] Delete failed: {e}")?;
                }
            },
            Command::Forget(None) => writeln!(out, "Usage: /forget <index>")?,
            Command::Wipe => match self.store.clear_all() {
                Ok(()) => writeln!(out, "[MEM] Wiped.")?,
                Err(e) => {
                    warn!(error = %e, "wipe failed");
                    writeln!(out, "[MEM] Wipe failed: {e}")?;
                }
            },
            Command::Fast => {
                if self.session.toggle_fast() {
                    writeln!(
                        out,
                        "[MODE] Fast ON (num_predict={}; voice off).",
                        self.config.fast_num_predict
                    )?;
                } else {
                    writeln!(out, "[MODE] Fast OFF.")?;
                }
            }
            Command::Voice => {
                self.config.voice = !self.config.voice;
                self.save_config();
                writeln!(out, "[MODE] Voice {}.", on_off(self.config.voice))?;
            }
            Command::Beeps => {
                self.config.beeps = !self.config.beeps;
                self.save_config();
                writeln!(out, "[MODE] Beeps {}.", on_off(self.config.beeps))?;
            }
            Command::Status => writeln!(
                out,
                "Model={} voice={} beeps={} fast={} num_predict={} history_turns={} facts={} turns={}",
                self.config.model,
                on_off(self.config.voice),
                on_off(self.config.beeps),
                on_off(self.session.fast_mode),
                self.config.num_predict_for(self.session.fast_mode),
                self.config.history_turns,
                self.store.len(),
                self.session.user_turns(),
            )?,
            Command::Reload => {
                self.reload();
                writeln!(out, "[INFO] Config + persona reloaded (full persona next turn).")?;
            }
            Command::Unknown(name) => writeln!(out, "[WARN] Unknown command: {name}")?,
            Command::Say(text) => self.converse(&text, out)?,
        }
        Ok(Flow::Continue)
    }

    fn converse(&mut self, user_text: &str, out: &mut impl Write) -> Result<()> {
        if self.config.auto_remember {
            if let Some(fact) = detect_fact(user_text) {
                match self.store.add(&fact) {
                    Ok(AddOutcome::Stored) => writeln!(out, "[MEM] Stored: {fact}")?,
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "auto-remember failed"),
                }
            }
        }

        let policy = ReminderPolicy {
            always: self.config.inject_micro_always,
            interval: self.config.reminder_interval,
        };
        let injection = self.session.persona_for_turn(policy);
        let persona = persona_text(
            injection,
            self.persona.as_deref(),
            &self.config.micro_persona,
        );

        let prompt = self.assembler.assemble(
            &self.store,
            &self.session,
            user_text,
            &self.config.callsign,
            persona,
        );
        info!(
            facts = prompt.relevant_facts.len(),
            prompt_words = prompt.word_count(),
            "prompt assembled"
        );

        let options = GenerateOptions {
            num_predict: self.config.num_predict_for(self.session.fast_mode),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let raw = match self
            .model
            .generate(&self.config.model, &prompt.to_prompt_string(), &options)
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "inference failed");
                writeln!(out, "K-14T: Error contacting model.")?;
                return Ok(());
            }
        };

        let reply = shape_reply(&raw, MAX_REPLY_SENTENCES);
        if self.config.beeps {
            write!(out, "\x07")?;
        }
        writeln!(out, "K-14T: {reply}")?;
        out.flush()?;

        if self.config.voice && !self.session.fast_mode {
            self.voice.speak(&reply);
        }

        self.session.record_exchange(user_text, reply);
        Ok(())
    }

    fn remember(&mut self, text: &str, out: &mut impl Write) -> Result<()> {
        match self.store.add(text) {
            Ok(AddOutcome::Stored) => writeln!(out, "[MEM] Stored: {}", text.trim())?,
            Ok(AddOutcome::Duplicate) => writeln!(out, "[MEM] Duplicate: {}", text.trim())?,
            Ok(AddOutcome::Empty) => writeln!(out, "Usage: /remember <fact>")?,
            Err(e) => {
                warn!(error = %e, "remember failed");
                writeln!(out, "[MEM] Store failed: {e}")?;
            }
        }
        Ok(())
    }

    fn list_memory(&self, out: &mut impl Write) -> Result<()> {
        let shown = self.store.list_recent(MEM_LISTING);
        if shown.is_empty() {
            writeln!(out, "[MEM] (none)")?;
            return Ok(());
        }

        // Positions are absolute so `/forget` addresses the same fact.
        let offset = self.store.len() - shown.len();
        writeln!(out, "[MEM]")?;
        for (i, fact) in shown.iter().enumerate() {
            writeln!(out, " [{}] {}", offset + i, fact.text)?;
        }
        Ok(())
    }

    fn reload(&mut self) {
        let mut config = LoopConfig::load_or_default(&self.config_path);
        if let Some(name) = &self.model_override {
            config.model = name.clone();
        }

        self.persona = config.load_persona();
        self.assembler = ContextAssembler::new(config.memory_max_injected);
        self.voice = Voice::new(config.voice_command.clone());
        self.config = config;
        self.session.reset_persona();
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            warn!(error = %e, "failed to save config");
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}
