//! Prompt template filling.

/// The placeholder replaced by the user's message.
pub const PLACEHOLDER: &str = "{{user_message}}";

/// Substitute the first `{{user_message}}` in `template` with `user_text`.
///
/// The text is inserted verbatim and is not scanned for further placeholders.
/// A template without a placeholder is returned unchanged.
pub fn fill(template: &str, user_text: &str) -> String {
    template.replacen(PLACEHOLDER, user_text, 1)
}

/// Whether `template` has an injection point for the user's message.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_answer_scenario() {
        assert_eq!(
            fill("Answer: {{user_message}}", "What is 2+2?"),
            "Answer: What is 2+2?"
        );
    }

    #[test]
    fn test_fill_replaces_only_first() {
        assert_eq!(
            fill("{{user_message}} / {{user_message}}", "x"),
            "x / {{user_message}}"
        );
    }

    #[test]
    fn test_fill_no_placeholder_returns_template() {
        let template = "The prompt is unavailable right now.";
        assert_eq!(fill(template, "hello there"), template);
        assert!(!has_placeholder(template));
    }

    #[test]
    fn test_fill_does_not_expand_user_placeholder() {
        let filled = fill("Q: {{user_message}} end", "{{user_message}}");
        assert_eq!(filled, "Q: {{user_message}} end");
    }

    #[test]
    fn test_fill_inserts_verbatim() {
        let user = "  <b>$1 \\n {braces}  ";
        let filled = fill("[{{user_message}}]", user);
        assert_eq!(filled, format!("[{user}]"));
    }

    #[test]
    fn test_fill_multibyte() {
        assert_eq!(
            fill("ユーザーの質問「{{user_message}}」", "天気は？"),
            "ユーザーの質問「天気は？」"
        );
    }
}
