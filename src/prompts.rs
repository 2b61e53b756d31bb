//! The classification prompt sent to the model.
//!
//! Kept in one place so prompt wording can change without touching the
//! process plumbing in [`crate::pipeline::classify`], and so tests can
//! inspect the exact text the model receives.
//!
//! Callers can override the template via
//! [`crate::config::LibrarianConfig::prompt`]; the `{text}` placeholder is
//! replaced with the document excerpt.

/// Default classification prompt. `{text}` is replaced with the excerpt.
pub const CLASSIFICATION_PROMPT: &str = r#"
You are a librarian assistant. Based on the following document, assign it a Dewey Decimal Classification and a short descriptive title.

Respond ONLY in the format:
<DDD Dewey Category> - <Short Title>

Example:
005 Computer Science - Generative AI and LLMs

Document content:
{text}
"#;

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the prompt for `text`, using `template` or the default.
pub fn build_prompt(template: Option<&str>, text: &str, max_chars: usize) -> String {
    template
        .unwrap_or(CLASSIFICATION_PROMPT)
        .replace("{text}", excerpt(text, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_shorter_than_limit_is_whole_text() {
        assert_eq!(excerpt("short", 3000), "short");
    }

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        // 'é' is two bytes; slicing by bytes would panic at 3.
        assert_eq!(excerpt("ééé€x", 3), "ééé");
    }

    #[test]
    fn prompt_truncates_document() {
        let text = "a".repeat(5000);
        let prompt = build_prompt(None, &text, 3000);
        assert!(prompt.contains(&"a".repeat(3000)));
        assert!(!prompt.contains(&"a".repeat(3001)));
        assert!(prompt.contains("<DDD Dewey Category> - <Short Title>"));
    }

    #[test]
    fn custom_template_is_used() {
        let prompt = build_prompt(Some("Label: {text}"), "hello", 10);
        assert_eq!(prompt, "Label: hello");
    }
}
