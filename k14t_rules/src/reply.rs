//! Reply shaping: keep model output short and in character.

/// Phrases that break character, removed case-insensitively.
const OUT_OF_CHARACTER: &[&str] = &["as an ai", "i am an ai", "language model"];

/// Role labels the model sometimes echoes at the start of a reply.
const ROLE_PREFIXES: &[&str] = &["user:", "k-14t:"];

/// Remove out-of-character phrases and collapse the leftover whitespace.
pub fn sanitize(reply: &str) -> String {
    let mut text = reply.to_string();
    for phrase in OUT_OF_CHARACTER {
        // ASCII lowercasing keeps byte offsets aligned with `text`.
        while let Some(start) = text.to_ascii_lowercase().find(phrase) {
            text.replace_range(start..start + phrase.len(), "");
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop leading `User:` / `K-14T:` labels.
pub fn strip_role_prefix(reply: &str) -> &str {
    let mut text = reply.trim();
    loop {
        let lower = text.to_ascii_lowercase();
        match ROLE_PREFIXES.iter().find(|p| lower.starts_with(**p)) {
            Some(prefix) => text = text[prefix.len()..].trim_start(),
            None => return text,
        }
    }
}

/// Keep at most `max_sentences` sentences, ending at `.`, `!` or `?`.
pub fn trim_sentences(reply: &str, max_sentences: usize) -> &str {
    let reply = reply.trim();
    if max_sentences == 0 {
        return "";
    }

    let mut seen = 0;
    let mut chars = reply.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            // "..." and "?!" end one sentence, not several
            if matches!(chars.peek(), Some((_, '.' | '!' | '?'))) {
                continue;
            }
            seen += 1;
            if seen == max_sentences {
                return reply[..idx + ch.len_utf8()].trim_end();
            }
        }
    }
    reply
}

/// Full post-processing applied to every model reply.
pub fn shape_reply(raw: &str, max_sentences: usize) -> String {
    let cleaned = sanitize(strip_role_prefix(raw));
    trim_sentences(&cleaned, max_sentences).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(
            sanitize("As an AI language model, I cannot   fly."),
            ", I cannot fly."
        );
        assert_eq!(sanitize("Systems nominal."), "Systems nominal.");
    }

    #[test]
    fn test_strip_role_prefix() {
        assert_eq!(strip_role_prefix("K-14T: Affirmative."), "Affirmative.");
        assert_eq!(strip_role_prefix("user: k-14t: Hi"), "Hi");
        assert_eq!(strip_role_prefix("Affirmative."), "Affirmative.");
    }

    #[test]
    fn test_trim_sentences() {
        assert_eq!(
            trim_sentences("Hello. How are you? Fine! Extra.", 2),
            "Hello. How are you?"
        );
        assert_eq!(trim_sentences("Wait... what?! Yes.", 2), "Wait... what?!");
        assert_eq!(trim_sentences("No terminator", 2), "No terminator");
        assert_eq!(trim_sentences("One.", 0), "");
    }

    #[test]
    fn test_shape_reply() {
        assert_eq!(
            shape_reply("K-14T: Roger. Servo calibrated. Anything else?", 2),
            "Roger. Servo calibrated."
        );
    }
}
