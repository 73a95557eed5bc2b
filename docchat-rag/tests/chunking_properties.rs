//! Property tests for the semantic chunker.

use docchat_rag::{RegexSentenceSplitter, SentenceSplitter, chunk_text};
use proptest::prelude::*;

/// Words joined by a mix of spaces, sentence ends, line breaks and blank lines.
fn arb_text() -> impl Strategy<Value = String> {
    let separator = prop_oneof![
        4 => Just(" "),
        2 => Just(". "),
        1 => Just("! "),
        1 => Just("? "),
        1 => Just("\n"),
        1 => Just("\r\n\r\n"),
        1 => Just(".\n \n"),
    ];
    proptest::collection::vec(("[a-zA-Z0-9]{1,14}", separator), 0..80).prop_map(|parts| {
        parts.into_iter().map(|(word, sep)| format!("{word}{sep}")).collect::<String>()
    })
}

fn normalized(text: &str) -> String {
    text.trim().replace('\r', "")
}

fn non_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Without overlap the chunks carry exactly the normalized text's
    /// non-whitespace characters, in order.
    #[test]
    fn chunks_reconstruct_content(
        text in arb_text(),
        chunk_size in 5usize..120,
        recursive in any::<bool>(),
    ) {
        let chunks = chunk_text(&text, chunk_size, 0, recursive).unwrap();
        prop_assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(&normalized(&text)));
    }

    /// Without recursion, words survive intact and in order.
    #[test]
    fn words_survive_without_recursion(text in arb_text(), chunk_size in 5usize..120) {
        let chunks = chunk_text(&text, chunk_size, 0, false).unwrap();
        let chunk_words: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let norm = normalized(&text);
        let text_words: Vec<&str> = norm.split_whitespace().collect();
        prop_assert_eq!(chunk_words, text_words);
    }

    /// A chunk only exceeds `chunk_size` when it is one indivisible sentence.
    #[test]
    fn oversized_chunks_are_single_sentences(text in arb_text(), chunk_size in 5usize..120) {
        for chunk in chunk_text(&text, chunk_size, 0, false).unwrap() {
            prop_assert!(!chunk.trim().is_empty());
            if chunk.chars().count() > chunk_size {
                prop_assert_eq!(RegexSentenceSplitter.split(&chunk).len(), 1, "chunk: {:?}", chunk);
            }
        }
    }

    /// With recursive splitting no chunk is longer than one and a half times
    /// `chunk_size` before overlap is added.
    #[test]
    fn recursion_bounds_chunk_length(text in arb_text(), chunk_size in 5usize..120) {
        for chunk in chunk_text(&text, chunk_size, 0, true).unwrap() {
            prop_assert!(chunk.chars().count() as f64 <= chunk_size as f64 * 1.5);
        }
    }

    /// Overlapped output keeps every un-overlapped chunk, in order, as the
    /// suffix of its own chunk. Extra chunks only come from empty flushes and
    /// hold nothing but a carried tail.
    #[test]
    fn overlap_only_prefixes(
        text in arb_text(),
        chunk_size in 10usize..120,
        overlap_ratio in 0.0f64..0.9,
    ) {
        let overlap = (chunk_size as f64 * overlap_ratio) as usize;
        let plain = chunk_text(&text, chunk_size, 0, false).unwrap();
        let overlapped = chunk_text(&text, chunk_size, overlap, false).unwrap();

        prop_assert!(overlapped.len() >= plain.len());
        if let (Some(a), Some(b)) = (plain.first(), overlapped.first()) {
            prop_assert_eq!(a, b);
        }

        let mut matched = 0;
        for chunk in &overlapped {
            if matched < plain.len() && chunk.ends_with(plain[matched].as_str()) {
                matched += 1;
            } else {
                prop_assert!(chunk.chars().count() <= overlap, "unexpected chunk {:?}", chunk);
            }
        }
        prop_assert_eq!(matched, plain.len());
    }

    #[test]
    fn chunking_is_deterministic(text in arb_text(), chunk_size in 5usize..120) {
        let overlap = chunk_size / 3;
        prop_assert_eq!(
            chunk_text(&text, chunk_size, overlap, true).unwrap(),
            chunk_text(&text, chunk_size, overlap, true).unwrap()
        );
    }
}
