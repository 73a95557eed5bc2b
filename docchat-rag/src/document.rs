//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document: the ownership unit for chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// File path or URL the text is extracted from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw text, when already loaded. Takes precedence over `source` during ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document that will be extracted from `source` at ingestion time.
    pub fn from_source(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), title: title.into(), source: Some(source.into()), ..Self::default() }
    }

    /// Create a document whose text is already in memory.
    pub fn from_text(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), title: title.into(), text: Some(text.into()), ..Self::default() }
    }
}

/// A span of a [`Document`]'s text with its (optional) vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{index}`.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Position of this chunk within its document.
    pub index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Chunks without one are
    /// skipped by retrieval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create an unembedded chunk for position `index` of `document_id`.
    pub fn new(document_id: &str, index: usize, text: impl Into<String>) -> Self {
        Self {
            id: format!("{document_id}_{index}"),
            document_id: document_id.to_string(),
            index,
            text: text.into(),
            embedding: None,
        }
    }

    /// Attach an embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A chunk's text paired with its similarity to a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// ID of the scored chunk.
    pub chunk_id: String,
    /// ID of the document the chunk belongs to.
    pub document_id: String,
    /// The chunk text.
    pub text: String,
    /// Cosine similarity in `[-1, 1]` (higher is more relevant).
    pub score: f32,
}
