//! Text cleanup applied to extracted content.

use std::sync::LazyLock;

use regex::Regex;

static MULTI_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n+").expect("BUG: hardcoded blank-line regex is invalid")
});

static PLAIN_TEXT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+").expect("BUG: hardcoded url regex is invalid")
});

/// Remove control characters, keeping newlines and tabs.
#[must_use]
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Collapse horizontal whitespace runs and squeeze repeated blank lines
/// down to a single paragraph break.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let joined = lines.join("\n");
    MULTI_BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Insert naive sentence-boundary line breaks: a period followed by
/// whitespace and an uppercase letter starts a new line. Used by the
/// maximal extractor, which otherwise produces one enormous run of text.
#[must_use]
pub fn insert_sentence_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == '.' {
            // Peek past a single space for an uppercase continuation
            if let Some(&next) = chars.peek() {
                if next == ' ' {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.peek().is_some_and(|c| c.is_uppercase()) {
                        chars.next();
                        out.push('\n');
                    }
                }
            }
        }
    }
    out
}

/// Post-processing for selector-based extraction: squeeze blank lines and
/// drop URLs that appear as plain text in the body.
#[must_use]
pub fn clean_extracted_text(text: &str) -> String {
    let without_urls = PLAIN_TEXT_URL.replace_all(text, "");
    MULTI_BLANK_LINES
        .replace_all(&without_urls, "\n\n")
        .trim()
        .to_string()
}

/// Whether the first kilobyte of decoded text contains no alphanumeric
/// characters, a sign the decode produced garbage.
#[must_use]
pub fn looks_corrupted(text: &str) -> bool {
    let head_end = text
        .char_indices()
        .take_while(|(i, _)| *i < 1024)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    let head = &text[..head_end];
    !head.is_empty() && !head.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_chars_keeps_structure() {
        let input = "a\u{0000}b\u{0007}c\nd\te";
        assert_eq!(strip_control_chars(input), "abc\nd\te");
    }

    #[test]
    fn normalizes_whitespace_runs() {
        let input = "Terms   of\tService\n\n\n\nSection  1";
        assert_eq!(normalize_whitespace(input), "Terms of Service\n\nSection 1");
    }

    #[test]
    fn sentence_breaks_only_before_uppercase() {
        let input = "First sentence. Second sentence. e.g. not here";
        let out = insert_sentence_breaks(input);
        assert_eq!(out, "First sentence.\nSecond sentence. e.g. not here");
    }

    #[test]
    fn cleanup_removes_plain_text_urls() {
        let input = "See https://example.com/terms for details.\n\n\nMore.";
        let out = clean_extracted_text(input);
        assert!(!out.contains("https://"));
        assert!(out.contains("More."));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn corruption_check_looks_at_first_kilobyte() {
        assert!(looks_corrupted("\u{fffd}\u{fffd} -- !!"));
        assert!(!looks_corrupted("Terms of Service"));
        assert!(!looks_corrupted(""));
    }
}
