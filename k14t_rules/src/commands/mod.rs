//! Command grammar for the chat loop.

/// A single line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave the loop.
    Exit,

    /// Switch model; `None` when the name is missing.
    Model(Option<String>),

    /// Change how the user is addressed; `None` when the name is missing.
    Callsign(Option<String>),

    /// Store a fact; `None` when no text was given.
    Remember(Option<String>),

    /// List remembered facts.
    Mem,

    /// Delete a fact by its listed position; `None` when the index is missing or not a number.
    Forget(Option<usize>),

    /// Delete every remembered fact.
    Wipe,

    /// Toggle fast mode.
    Fast,

    /// Toggle spoken replies.
    Voice,

    /// Toggle the terminal bell.
    Beeps,

    /// Show current settings.
    Status,

    /// Reload config and persona; the full persona is injected again next turn.
    Reload,

    /// Anything else starting with `/`.
    Unknown(String),

    /// Plain chat input for the model.
    Say(String),
}

impl Command {
    /// Classify a line of input. Returns `None` for blank input.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let lower = input.to_lowercase();
        if matches!(lower.as_str(), "exit" | "quit") {
            return Some(Command::Exit);
        }
        if !input.starts_with('/') {
            return Some(Command::Say(input.to_string()));
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match head.to_lowercase().as_str() {
            "/exit" | "/quit" => Command::Exit,
            "/model" => Command::Model(arg),
            "/callsign" => Command::Callsign(arg),
            "/remember" => Command::Remember(arg),
            "/mem" => Command::Mem,
            "/forget" => Command::Forget(rest.parse().ok()),
            "/wipe" => Command::Wipe,
            "/fast" => Command::Fast,
            "/voice" => Command::Voice,
            "/beeps" => Command::Beeps,
            "/status" => Command::Status,
            "/reload" => Command::Reload,
            _ => Command::Unknown(head.to_string()),
        };
        Some(command)
    }

    /// One-line help listing the available commands.
    pub fn help() -> &'static str {
        "Commands: /remember <fact>, /mem, /forget <i>, /wipe, /model <name>, /callsign <name>, \
         /fast, /voice, /beeps, /status, /reload, /exit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_exit_variants() {
        for input in ["/exit", "/quit", "exit", "QUIT", "/Exit"] {
            assert_eq!(Command::parse(input), Some(Command::Exit), "{input}");
        }
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            Command::parse("/model  llama3:8b "),
            Some(Command::Model(Some("llama3:8b".to_string())))
        );
        assert_eq!(Command::parse("/model"), Some(Command::Model(None)));
        assert_eq!(
            Command::parse("/remember I like tea"),
            Some(Command::Remember(Some("I like tea".to_string())))
        );
        assert_eq!(Command::parse("/remember"), Some(Command::Remember(None)));
        assert_eq!(
            Command::parse("/callsign Rey"),
            Some(Command::Callsign(Some("Rey".to_string())))
        );
    }

    #[test]
    fn test_forget_index() {
        assert_eq!(Command::parse("/forget 2"), Some(Command::Forget(Some(2))));
        assert_eq!(Command::parse("/forget two"), Some(Command::Forget(None)));
        assert_eq!(Command::parse("/forget -1"), Some(Command::Forget(None)));
        assert_eq!(Command::parse("/forget"), Some(Command::Forget(None)));
    }

    #[test]
    fn test_toggles_and_unknown() {
        assert_eq!(Command::parse("/fast"), Some(Command::Fast));
        assert_eq!(Command::parse("/voice"), Some(Command::Voice));
        assert_eq!(Command::parse("/beeps"), Some(Command::Beeps));
        assert_eq!(Command::parse("/wipe"), Some(Command::Wipe));
        assert_eq!(
            Command::parse("/dance now"),
            Some(Command::Unknown("/dance".to_string()))
        );
    }

    #[test]
    fn test_plain_text_is_say() {
        assert_eq!(
            Command::parse("  Do you like tea? "),
            Some(Command::Say("Do you like tea?".to_string()))
        );
    }
}
