//! Document question answering over semantically chunked text.
//!
//! This crate provides:
//! - Paragraph and sentence aware chunking with overlap ([`SemanticChunker`], [`chunk_text`])
//! - Cosine similarity scoring and stable top-k selection ([`cosine_similarity`], [`top_k`])
//! - Traits for the collaborators around them: text extraction, embeddings,
//!   chunk storage and answer generation
//! - A [`DocumentQa`] pipeline tying ingestion and question answering together
//!
//! # Features
//!
//! - `http`: fetch `http(s)://` document sources in [`FileTextExtractor`]
//! - `openai`: OpenAI embedding provider and answer generator

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod inmemory;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod sentence;
pub mod store;

#[cfg(feature = "openai")]
pub mod openai;

pub use answer::AnswerGenerator;
pub use chunking::{Chunker, SemanticChunker, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{FileTextExtractor, TextExtractor};
pub use inmemory::InMemoryChunkStore;
pub use pipeline::{
    Answer, AnswerOutcome, DocumentQa, DocumentQaBuilder, NO_CONTENT_MESSAGE, NO_DOCUMENTS_MESSAGE,
};
pub use prompt::rag_prompt;
pub use retrieval::{build_context, cosine_similarity, top_k};
pub use sentence::{RegexSentenceSplitter, SentenceSplitter, UnicodeSentenceSplitter};
pub use store::ChunkStore;
