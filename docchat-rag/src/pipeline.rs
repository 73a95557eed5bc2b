//! Document question-answering pipeline.
//!
//! [`DocumentQa`] coordinates ingestion (extract → chunk → embed → store) and
//! question answering (load chunks → embed question → top-k → generate) by
//! composing a [`TextExtractor`], a [`Chunker`], an [`EmbeddingProvider`], a
//! [`ChunkStore`] and an [`AnswerGenerator`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{DocumentQa, Document, InMemoryChunkStore, RagConfig};
//!
//! let qa = DocumentQa::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .store(Arc::new(InMemoryChunkStore::new()))
//!     .answer_generator(Arc::new(my_llm))
//!     .build()?;
//!
//! qa.ingest(&Document::from_source("handbook", "Handbook", "docs/handbook.md")).await?;
//! let answer = qa.ask(&["handbook"], "How many vacation days do I get?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::answer::AnswerGenerator;
use crate::chunking::{Chunker, SemanticChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{FileTextExtractor, TextExtractor};
use crate::retrieval::{build_context, top_k};
use crate::store::ChunkStore;

/// Reply used when a question is asked without any linked documents.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents are linked to this chat.";

/// Reply used when the linked documents have no embedded chunks.
pub const NO_CONTENT_MESSAGE: &str = "No content found for the selected documents.";

/// How an [`Answer`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The answer generator produced the text from retrieved context.
    Generated,
    /// No documents were given; the text is [`NO_DOCUMENTS_MESSAGE`].
    NoDocuments,
    /// Nothing could be retrieved; the text is [`NO_CONTENT_MESSAGE`].
    NoContent,
}

/// The reply to a question, with the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Reply text shown to the user.
    pub text: String,
    /// Whether the text came from the generator or is a canned reply.
    pub outcome: AnswerOutcome,
    /// Retrieved chunks in descending score order. Empty for canned replies.
    pub sources: Vec<ScoredChunk>,
}

impl Answer {
    fn canned(outcome: AnswerOutcome, text: &str) -> Self {
        Self { text: text.to_string(), outcome, sources: Vec::new() }
    }
}

/// The ingestion and question-answering orchestrator.
///
/// Construct one via [`DocumentQa::builder()`].
pub struct DocumentQa {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    extractor: Arc<dyn TextExtractor>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    answer_generator: Arc<dyn AnswerGenerator>,
}

impl DocumentQa {
    /// Create a new [`DocumentQaBuilder`].
    pub fn builder() -> DocumentQaBuilder {
        DocumentQaBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the chunk store.
    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Ingest a single document: extract → chunk → embed → store.
    ///
    /// Uses `document.text` when present, otherwise extracts from
    /// `document.source`. Extraction and embedding run before anything is
    /// written. If storing the chunks fails, the document record is removed
    /// again, so a failed ingestion leaves the document absent from the store.
    /// Returns the stored chunks with embeddings attached.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] if the document has neither text nor source.
    /// - Extraction, embedding and store errors are returned unchanged.
    /// - [`RagError::Pipeline`] if the provider returns the wrong number of vectors.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>> {
        // 1. Load the raw text
        let text = match (&document.text, &document.source) {
            (Some(text), _) => text.clone(),
            (None, Some(source)) => self.extractor.extract(source).await.map_err(|e| {
                error!(
                    document.id = %document.id,
                    source = %source,
                    error = %e,
                    "text extraction failed"
                );
                e
            })?,
            (None, None) => {
                return Err(RagError::InvalidArgument(format!(
                    "document '{}' has neither text nor source",
                    document.id
                )));
            }
        };

        // 2. Chunk
        let mut chunks = self.chunker.chunk(&document.id, &text);
        debug!(
            document.id = %document.id,
            text_len = text.len(),
            chunk_count = chunks.len(),
            "chunked document"
        );

        // 3. Embed
        if !chunks.is_empty() {
            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
                e
            })?;

            if embeddings.len() != chunks.len() {
                error!(
                    document.id = %document.id,
                    expected = chunks.len(),
                    actual = embeddings.len(),
                    "embedding count mismatch"
                );
                return Err(RagError::Pipeline(format!(
                    "embedding provider returned {} vectors for {} chunks of document '{}'",
                    embeddings.len(),
                    chunks.len(),
                    document.id
                )));
            }

            for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
                chunk.embedding = Some(embedding);
            }
        }

        // 4. Persist
        self.store.put_document(document).await?;
        if let Err(e) = self.store.put_chunks(&document.id, &chunks).await {
            error!(document.id = %document.id, error = %e, "storing chunks failed");
            if let Err(cleanup) = self.store.delete_document(&document.id).await {
                warn!(
                    document.id = %document.id,
                    error = %cleanup,
                    "failed to remove document after chunk storage error"
                );
            }
            return Err(e);
        }

        info!(document.id = %document.id, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Ingest several documents, stopping at the first failure.
    ///
    /// Returns all chunks that were stored across all documents.
    pub async fn ingest_batch(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for document in documents {
            all_chunks.extend(self.ingest(document).await?);
        }
        Ok(all_chunks)
    }

    /// Retrieve the chunks of `document_ids` most similar to `question`.
    ///
    /// Returns an empty list, without calling the embedding provider, when the
    /// documents have no embedded chunks. Results below the configured
    /// `similarity_threshold` are dropped.
    ///
    /// # Errors
    ///
    /// Store and embedding errors are returned unchanged.
    pub async fn retrieve(
        &self,
        document_ids: &[&str],
        question: &str,
    ) -> Result<Vec<ScoredChunk>> {
        let chunks = self.store.chunks_for_documents(document_ids).await?;
        if chunks.iter().all(|c| c.embedding.is_none()) {
            debug!(document_count = document_ids.len(), "no embedded chunks to search");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_provider.embed(question).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let mut results = top_k(&query_embedding, &chunks, self.config.top_k);
        if let Some(threshold) = self.config.similarity_threshold {
            results.retain(|r| r.score >= threshold);
        }

        debug!(candidates = chunks.len(), result_count = results.len(), "retrieval completed");
        Ok(results)
    }

    /// Answer `question` from the chunks of `document_ids`.
    ///
    /// Missing documents or missing content are not errors: they produce an
    /// [`Answer`] with [`AnswerOutcome::NoDocuments`] or
    /// [`AnswerOutcome::NoContent`] and a canned message.
    ///
    /// # Errors
    ///
    /// Store, embedding and generation errors are returned unchanged.
    pub async fn ask(&self, document_ids: &[&str], question: &str) -> Result<Answer> {
        if document_ids.is_empty() {
            info!(outcome = "no_documents", "question answered");
            return Ok(Answer::canned(AnswerOutcome::NoDocuments, NO_DOCUMENTS_MESSAGE));
        }

        let sources = self.retrieve(document_ids, question).await?;
        if sources.is_empty() {
            info!(outcome = "no_content", "question answered");
            return Ok(Answer::canned(AnswerOutcome::NoContent, NO_CONTENT_MESSAGE));
        }

        let context = build_context(&sources);
        let text = self.answer_generator.generate(question, &context).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            e
        })?;

        info!(outcome = "generated", source_count = sources.len(), "question answered");
        Ok(Answer { text, outcome: AnswerOutcome::Generated, sources })
    }

    /// Delete a document together with its chunks.
    pub async fn delete_document(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_document(id).await?;
        info!(document.id = id, deleted, "deleted document");
        Ok(deleted)
    }
}

/// Builder for constructing a [`DocumentQa`].
///
/// The embedding provider, store and answer generator are required. The
/// config defaults to [`RagConfig::default()`], the chunker to a
/// [`SemanticChunker`] built from the config and the extractor to
/// [`FileTextExtractor`].
#[derive(Default)]
pub struct DocumentQaBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn ChunkStore>>,
    answer_generator: Option<Arc<dyn AnswerGenerator>>,
}

impl DocumentQaBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default [`SemanticChunker`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Replace the default [`FileTextExtractor`].
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the chunk store.
    pub fn store(mut self, store: Arc<dyn ChunkStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the answer generator.
    pub fn answer_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.answer_generator = Some(generator);
        self
    }

    /// Build the [`DocumentQa`], validating the config and required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or the
    /// config is inconsistent.
    pub fn build(self) -> Result<DocumentQa> {
        let config = self.config.unwrap_or_default();
        config.validate_chunking().map_err(|e| RagError::Config(e.to_string()))?;
        if config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }

        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let answer_generator = self
            .answer_generator
            .ok_or_else(|| RagError::Config("answer_generator is required".to_string()))?;

        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(SemanticChunker::from_config(&config)?),
        };
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(FileTextExtractor::new()));

        Ok(DocumentQa { config, chunker, extractor, embedding_provider, store, answer_generator })
    }
}
