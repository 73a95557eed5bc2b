//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait, implemented by
//! [`SemanticChunker`] (paragraph and sentence aware packing with overlap),
//! and the [`chunk_text`] convenience function.
//!
//! All lengths are counted in `char`s, so multi-byte text is never cut inside
//! a code point.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::{RagConfig, validate_chunk_params};
use crate::document::Chunk;
use crate::error::Result;
use crate::sentence::{RegexSentenceSplitter, SentenceSplitter};

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"));

/// A strategy for splitting document text into chunks.
///
/// Implementations produce [`Chunk`]s without embeddings. Embeddings are
/// attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split `text` belonging to `document_id` into ordered chunks.
    ///
    /// Returns an empty `Vec` for empty (or whitespace-only) text.
    fn chunk(&self, document_id: &str, text: &str) -> Vec<Chunk>;
}

/// Split `text` into overlapping, sentence-aware chunks with the default
/// regex sentence splitter.
///
/// # Errors
///
/// Returns [`RagError::InvalidArgument`](crate::RagError::InvalidArgument) if
/// `chunk_size == 0` or `overlap >= chunk_size`. Nothing is processed in that case.
///
/// # Example
///
/// ```rust
/// use docchat_rag::chunk_text;
///
/// let chunks = chunk_text("Sentence one. Sentence two. Sentence three.", 20, 0, false)?;
/// assert_eq!(chunks, ["Sentence one.", "Sentence two.", "Sentence three."]);
/// # Ok::<(), docchat_rag::RagError>(())
/// ```
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    recursive: bool,
) -> Result<Vec<String>> {
    Ok(SemanticChunker::new(chunk_size, overlap)?.with_recursive(recursive).split(text))
}

/// Splits text by paragraphs, packs sentences up to `chunk_size`, re-splits
/// oversized chunks by length and prepends overlap from the previous chunk.
///
/// The overlap for chunk `n` is taken from the already-overlapped chunk
/// `n - 1`, so once the predecessor is shorter than `overlap` the carried
/// prefix grows with each chunk.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::SemanticChunker;
///
/// let chunker = SemanticChunker::new(800, 150)?;
/// let pieces = chunker.split(&text);
/// ```
#[derive(Clone)]
pub struct SemanticChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    recursive: bool,
    splitter: Arc<dyn SentenceSplitter>,
}

impl fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticChunker")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("recursive", &self.recursive)
            .finish_non_exhaustive()
    }
}

impl SemanticChunker {
    /// Create a new `SemanticChunker` with recursive splitting enabled.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: target maximum number of characters per chunk
    /// * `chunk_overlap`: number of trailing characters carried into the next chunk
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`](crate::RagError::InvalidArgument)
    /// if `chunk_size == 0` or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunk_params(chunk_size, chunk_overlap)?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
            recursive: true,
            splitter: Arc::new(RegexSentenceSplitter),
        })
    }

    /// Create a chunker from the chunking fields of a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Ok(Self::new(config.chunk_size, config.chunk_overlap)?.with_recursive(config.recursive))
    }

    /// Enable or disable length-based re-splitting of chunks longer than
    /// `1.5 * chunk_size`.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Replace the sentence splitter.
    pub fn with_sentence_splitter(mut self, splitter: Arc<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Split raw text into chunk strings.
    pub fn split(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let paragraphs = split_paragraphs(&normalized);
        let mut chunks = self.pack_sentences(&paragraphs);

        if self.recursive {
            chunks = split_oversized(chunks, self.chunk_size, self.chunk_overlap);
        }
        let chunks = apply_overlap(chunks, self.chunk_overlap);

        chunks
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Greedily pack each paragraph's sentences into chunks of at most
    /// `chunk_size` characters. A sentence that does not fit anywhere becomes
    /// its own (oversized) chunk.
    ///
    /// A sentence that does not fit flushes the buffer even when it is still
    /// empty. The empty chunk is dropped by the final pass unless overlap has
    /// given it the previous chunk's tail.
    fn pack_sentences(&self, paragraphs: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();

        for paragraph in paragraphs {
            let mut current = String::new();
            let mut current_len = 0;

            for sentence in self.splitter.split(paragraph) {
                let sentence_len = sentence.chars().count();
                if current_len + sentence_len + 1 <= self.chunk_size {
                    if !current.is_empty() {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.push_str(sentence);
                    current_len += sentence_len;
                } else {
                    chunks.push(std::mem::take(&mut current));
                    current.push_str(sentence);
                    current_len = sentence_len;
                }
            }

            if !current.is_empty() {
                chunks.push(current);
            }
        }

        chunks
    }
}

impl Chunker for SemanticChunker {
    fn chunk(&self, document_id: &str, text: &str) -> Vec<Chunk> {
        into_chunks(document_id, self.split(text))
    }
}

fn into_chunks(document_id: &str, texts: Vec<String>) -> Vec<Chunk> {
    texts.into_iter().enumerate().map(|(i, text)| Chunk::new(document_id, i, text)).collect()
}

/// Trim the text and drop carriage returns, keeping `\n` line breaks.
fn normalize(text: &str) -> String {
    text.trim().replace('\r', "")
}

/// Split on blank lines (a newline, optional whitespace, another newline).
fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK.split(text).map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Replace every chunk longer than `1.5 * chunk_size` with length-based windows.
fn split_oversized(chunks: Vec<String>, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let limit = chunk_size as f64 * 1.5;
    let mut result = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.chars().count() as f64 > limit {
            result.extend(split_by_length(&chunk, chunk_size, chunk_overlap));
        } else {
            result.push(chunk);
        }
    }
    result
}

/// Windows of `chunk_size` characters, each starting `chunk_size - chunk_overlap`
/// characters after the previous one.
fn split_by_length(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }
    chunks
}

/// Prefix every chunk after the first with the last `overlap` characters of
/// the previous output chunk.
fn apply_overlap(chunks: Vec<String>, overlap: usize) -> Vec<String> {
    if overlap == 0 || chunks.len() <= 1 {
        return chunks;
    }

    let mut overlapped: Vec<String> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let next = match overlapped.last() {
            Some(prev) => format!("{} {chunk}", tail_chars(prev, overlap)),
            None => chunk,
        };
        overlapped.push(next);
    }
    overlapped
}

fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}
