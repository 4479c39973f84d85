//! Spoken replies through an external speech program.

use std::process::{Command, Stdio};

/// Hands reply text to a speech command such as `espeak`.
#[derive(Debug, Clone)]
pub struct Voice {
    command: String,
}

impl Voice {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Speak `text`, waiting for playback to finish.
    ///
    /// Failures are logged; the chat loop carries on without sound.
    pub fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.command.trim().is_empty() {
            return;
        }

        let status = Command::new(&self.command)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(command = %self.command, %status, "speech command failed"),
            Err(e) => tracing::warn!(command = %self.command, error = %e, "speech command unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_does_not_panic() {
        Voice::new("k14t-no-such-speech-program").speak("hello");
        Voice::new("").speak("hello");
    }
}
