//! Short previews of note bodies.

use std::sync::LazyLock;

use regex::Regex;

/// Default maximum summary length, in characters.
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

#[allow(clippy::expect_used)]
static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("paragraph pattern is valid"));

#[allow(clippy::expect_used)]
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Summarize a note body in at most `max_length` characters.
///
/// Takes the first paragraph. If it is too long, whole sentences are kept
/// (each ending in `.`) for as long as they fit. When not even the first
/// sentence fits, the paragraph is cut at `max_length` and `...` appended,
/// so the result never exceeds `max_length + 3` characters.
#[must_use]
pub fn summarize(body: &str, max_length: usize) -> String {
    let paragraph = first_paragraph(body);
    if paragraph.chars().count() <= max_length {
        return paragraph.to_string();
    }

    let mut summary = String::new();
    let mut length = 0;
    for sentence in SENTENCE_END_RE.split(paragraph) {
        if sentence.trim().is_empty() {
            continue;
        }
        let added = sentence.chars().count() + 1;
        if length + added > max_length {
            break;
        }
        summary.push_str(sentence);
        summary.push('.');
        length += added;
    }

    if summary.is_empty() {
        let mut truncated: String = paragraph.chars().take(max_length).collect();
        truncated.push_str(ELLIPSIS);
        return truncated;
    }

    summary
}

fn first_paragraph(body: &str) -> &str {
    let paragraph = match PARAGRAPH_BREAK_RE.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    };
    paragraph.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_paragraph_is_returned_whole() {
        assert_eq!(summarize("A short note.", 200), "A short note.");
    }

    #[test]
    fn only_first_paragraph_is_used() {
        let body = "First paragraph here.\n\nSecond paragraph.";
        assert_eq!(summarize(body, 200), "First paragraph here.");
    }

    #[test]
    fn whitespace_only_line_breaks_paragraphs() {
        let body = "First.\n   \nSecond.";
        assert_eq!(summarize(body, 200), "First.");
    }

    #[test]
    fn empty_body() {
        assert_eq!(summarize("", 200), "");
        assert_eq!(summarize("\n\n\n", 200), "");
    }

    #[test]
    fn long_paragraph_keeps_whole_sentences() {
        let body = "One two three. Four five six! Seven eight nine? Ten eleven twelve.";
        let summary = summarize(body, 30);
        assert_eq!(summary, "One two three. Four five six.");
        assert!(summary.chars().count() <= 30);
    }

    #[test]
    fn stops_at_first_sentence_that_does_not_fit() {
        let body = "Short. This sentence is much too long to fit in the budget. Tiny.";
        assert_eq!(summarize(body, 20), "Short.");
    }

    #[test]
    fn falls_back_to_truncation() {
        let body = "a".repeat(300);
        let summary = summarize(&body, 200);
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let body = "é".repeat(50);
        let summary = summarize(&body, 10);
        assert_eq!(summary, format!("{}...", "é".repeat(10)));
    }

    #[test]
    fn never_exceeds_bound() {
        let inputs = [
            "",
            "x",
            "Sentence one. Sentence two. Sentence three.",
            "No punctuation at all but quite a lot of words in a row going on and on",
            "!!!...???",
            "Mixed.\r\n\r\nWindows breaks.",
        ];
        for input in inputs {
            for max in [0, 1, 5, 10, 40] {
                let summary = summarize(input, max);
                assert!(
                    summary.chars().count() <= max + 3,
                    "{input:?} with max {max} gave {summary:?}"
                );
            }
        }
    }
}
