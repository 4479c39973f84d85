//! Fact detection in ordinary chat input.

/// Prefixes that explicitly ask for the rest of the line to be remembered.
const REMEMBER_PREFIXES: &[&str] = &["remember that ", "remember "];

/// Phrases that mark a statement about the user worth remembering.
const TRIGGER_PHRASES: &[&str] = &[
    "my name is",
    "call me",
    "i like",
    "i love",
    "i prefer",
    "i hate",
    "my favorite",
    "my favourite",
    "i live in",
    "i am working on",
    "i'm working on",
    "my project",
];

/// Decide whether chat input should be remembered, and what text to store.
///
/// Questions are never remembered.
pub fn detect_fact(user_text: &str) -> Option<String> {
    let text = user_text.trim();
    if text.is_empty() || text.ends_with('?') {
        return None;
    }

    // The first matching prefix decides; "remember that." alone has nothing to store.
    let prefix = REMEMBER_PREFIXES.iter().find(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    });
    if let Some(prefix) = prefix {
        let rest = clean(&text[prefix.len()..]);
        let empty = rest.is_empty() || rest.eq_ignore_ascii_case("that");
        return (!empty).then(|| rest.to_string());
    }

    let padded = format!(" {} ", text.to_lowercase());
    TRIGGER_PHRASES
        .iter()
        .any(|phrase| padded.contains(&format!(" {phrase} ")))
        .then(|| clean(text).to_string())
        .filter(|fact| !fact.is_empty())
}

fn clean(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', ',', ';']).trim_end()
}
