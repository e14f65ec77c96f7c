//! Control-character hygiene for terminal output and converted text.

use crate::entities::REPLACEMENT_CHAR;
use std::borrow::Cow;

/// C0 controls other than tab, LF and CR, plus DEL and the C1 range.
pub fn is_unsafe_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Removes unsafe control characters, keeping tab, newline and carriage return.
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|&c| !is_unsafe_control(c)).collect()
}

/// Replaces unsafe control characters with U+FFFD.
///
/// Unlike [`strip_control_chars`] this never joins the text on either side
/// of the removed character.
pub fn replace_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_unsafe_control) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_unsafe_control(c) { REPLACEMENT_CHAR } else { c })
            .collect(),
    )
}

/// Makes a URL safe to embed in a terminal escape sequence.
pub fn sanitize_for_terminal(url: &str) -> String {
    strip_control_chars(url)
}

/// Wraps a URL in an OSC 8 hyperlink so terminals render it clickable.
pub fn osc8_hyperlink(url: &str) -> String {
    let url = sanitize_for_terminal(url);
    format!("\x1b]8;;{url}\x1b\\{url}\x1b]8;;\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_control_chars("Hello World"), "Hello World");
        assert_eq!(strip_control_chars("col1\tcol2\r\nnext"), "col1\tcol2\r\nnext");
        assert_eq!(strip_control_chars(""), "");
    }

    #[test]
    fn test_strips_controls() {
        assert_eq!(strip_control_chars("a\x00b"), "ab");
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
        assert_eq!(strip_control_chars("a\x07b"), "ab");
        assert_eq!(strip_control_chars("a\x7fb"), "ab");
        assert_eq!(strip_control_chars("a\u{80}b\u{9f}c"), "abc");
        assert_eq!(strip_control_chars("\x00\t\n\r\x1b\x07\x7f"), "\t\n\r");
        assert_eq!(strip_control_chars("\x00\x01\x02\x03"), "");
    }

    #[test]
    fn test_replace_keeps_tokens_apart() {
        assert_eq!(replace_control_chars("a\x1bb"), "a\u{FFFD}b");
        assert!(matches!(replace_control_chars("clean"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_terminal_url() {
        let url = "https://www.biblegateway.com/passage/?search=Genesis%201&version=NIV";
        assert_eq!(sanitize_for_terminal(url), url);

        let malicious = "https://example.com\x1b]8;;evil\x1b\\attack";
        let sanitized = sanitize_for_terminal(malicious);
        assert!(!sanitized.contains('\x1b'));
        assert!(sanitized.starts_with("https://example.com"));

        assert_eq!(sanitize_for_terminal("https://example.com\x00path"), "https://example.compath");
    }

    #[test]
    fn test_osc8_hyperlink() {
        let link = osc8_hyperlink("https://biblegateway.com/\x1b[31m");
        assert_eq!(
            link,
            "\x1b]8;;https://biblegateway.com/[31m\x1b\\https://biblegateway.com/[31m\x1b]8;;\x1b\\"
        );
    }
}
