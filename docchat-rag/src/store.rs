//! Persistence trait for documents and their embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, Document};
use crate::error::Result;

/// A storage backend for documents and their chunks.
///
/// Chunks are owned by exactly one document and are removed together with
/// it. The pipeline loads chunks into memory and scores them itself, so a
/// store only needs lookup by document id.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{ChunkStore, InMemoryChunkStore};
///
/// let store = InMemoryChunkStore::new();
/// store.put_document(&document).await?;
/// store.put_chunks(&document.id, &chunks).await?;
/// let chunks = store.chunks_for_documents(&["doc-1"]).await?;
/// ```
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or replace a document record.
    async fn put_document(&self, document: &Document) -> Result<()>;

    /// Fetch a document by id.
    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// List all documents, ordered by id.
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Delete a document and all of its chunks. Returns `false` if it did not exist.
    async fn delete_document(&self, id: &str) -> Result<bool>;

    /// Replace the chunks stored for `document_id`.
    ///
    /// Fails if the document has not been stored first.
    async fn put_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()>;

    /// Load the chunks of the given documents, grouped by document in the
    /// order of `document_ids` and by chunk index within each document.
    /// Unknown ids contribute nothing.
    async fn chunks_for_documents(&self, document_ids: &[&str]) -> Result<Vec<Chunk>>;
}
