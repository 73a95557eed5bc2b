//! Sentence splitting strategies used by the chunker.
//!
//! [`RegexSentenceSplitter`] is the deterministic default: it breaks after
//! `.`, `!` or `?` when followed by whitespace. [`UnicodeSentenceSplitter`]
//! follows the UAX #29 sentence boundary rules and copes better with
//! abbreviations such as "e.g." or decimal numbers.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"));

/// Splits a paragraph into sentences.
///
/// Implementations must be deterministic and must not drop non-whitespace
/// text: the returned sentences, joined with single spaces, cover the input.
pub trait SentenceSplitter: Send + Sync {
    /// Split `text` into trimmed, non-empty sentences in order.
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Breaks after sentence punctuation followed by whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSentenceSplitter;

impl SentenceSplitter for RegexSentenceSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in SENTENCE_END.find_iter(text) {
            // The punctuation mark is one byte; keep it with the sentence.
            let end = boundary.start() + 1;
            push_trimmed(&mut sentences, &text[start..end]);
            start = boundary.end();
        }
        push_trimmed(&mut sentences, &text[start..]);

        sentences
    }
}

/// Uses Unicode (UAX #29) sentence boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        for segment in text.split_sentence_bounds() {
            push_trimmed(&mut sentences, segment);
        }
        sentences
    }
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_splits_on_terminal_punctuation() {
        let sentences = RegexSentenceSplitter.split("One. Two! Three?  Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn regex_requires_whitespace_after_punctuation() {
        let sentences = RegexSentenceSplitter.split("Version 1.5 shipped.Next line");
        assert_eq!(sentences, vec!["Version 1.5 shipped.Next line"]);
    }

    #[test]
    fn regex_breaks_across_newlines() {
        let sentences = RegexSentenceSplitter.split("First line.\nSecond line.");
        assert_eq!(sentences, vec!["First line.", "Second line."]);
    }

    #[test]
    fn regex_handles_empty_input() {
        assert!(RegexSentenceSplitter.split("").is_empty());
        assert!(RegexSentenceSplitter.split("   ").is_empty());
    }

    #[test]
    fn unicode_keeps_lowercase_continuations() {
        let text = "Use e.g. this one. Next.";
        assert_eq!(UnicodeSentenceSplitter.split(text), vec!["Use e.g. this one.", "Next."]);
        assert_eq!(RegexSentenceSplitter.split(text), vec!["Use e.g.", "this one.", "Next."]);
    }

    #[test]
    fn unicode_splits_plain_sentences() {
        let sentences = UnicodeSentenceSplitter.split("Hello world. How are you? Fine!");
        assert_eq!(sentences, vec!["Hello world.", "How are you?", "Fine!"]);
    }
}
