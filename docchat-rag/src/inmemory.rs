//! In-memory chunk store.
//!
//! This module provides [`InMemoryChunkStore`], a dependency-free store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for the CLI, tests, and small single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::store::ChunkStore;

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    chunks: Vec<Chunk>,
}

/// An in-memory [`ChunkStore`].
///
/// Documents are keyed by id; each entry owns its chunk list, so deleting a
/// document drops its chunks with it.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{ChunkStore, InMemoryChunkStore};
///
/// let store = InMemoryChunkStore::new();
/// store.put_document(&document).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryChunkStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl InMemoryChunkStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn put_document(&self, document: &Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents
            .entry(document.id.clone())
            .and_modify(|stored| stored.document = document.clone())
            .or_insert_with(|| StoredDocument { document: document.clone(), chunks: Vec::new() });
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(id).map(|stored| stored.document.clone()))
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut list: Vec<Document> = documents.values().map(|s| s.document.clone()).collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(id).is_some())
    }

    async fn put_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()> {
        let mut documents = self.documents.write().await;
        let stored = documents.get_mut(document_id).ok_or_else(|| RagError::Store {
            backend: "InMemory".to_string(),
            message: format!("document '{document_id}' does not exist"),
        })?;
        if let Some(stray) = chunks.iter().find(|c| c.document_id != document_id) {
            return Err(RagError::Store {
                backend: "InMemory".to_string(),
                message: format!(
                    "chunk '{}' belongs to '{}', not '{document_id}'",
                    stray.id, stray.document_id
                ),
            });
        }
        let mut chunks = chunks.to_vec();
        chunks.sort_by_key(|c| c.index);
        stored.chunks = chunks;
        Ok(())
    }

    async fn chunks_for_documents(&self, document_ids: &[&str]) -> Result<Vec<Chunk>> {
        let documents = self.documents.read().await;
        Ok(document_ids
            .iter()
            .filter_map(|id| documents.get(*id))
            .flat_map(|stored| stored.chunks.iter().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_cascades_to_chunks() {
        let store = InMemoryChunkStore::new();
        let doc = Document::from_text("a", "A", "text");
        store.put_document(&doc).await.unwrap();
        store.put_chunks("a", &[Chunk::new("a", 0, "text")]).await.unwrap();

        assert_eq!(store.chunks_for_documents(&["a"]).await.unwrap().len(), 1);
        assert!(store.delete_document("a").await.unwrap());
        assert!(store.chunks_for_documents(&["a"]).await.unwrap().is_empty());
        assert!(store.get_document("a").await.unwrap().is_none());
        assert!(!store.delete_document("a").await.unwrap());
    }

    #[tokio::test]
    async fn put_chunks_requires_document() {
        let store = InMemoryChunkStore::new();
        let err = store.put_chunks("missing", &[]).await.unwrap_err();
        assert!(matches!(err, RagError::Store { .. }));
    }

    #[tokio::test]
    async fn put_chunks_rejects_foreign_chunks() {
        let store = InMemoryChunkStore::new();
        store.put_document(&Document::from_text("a", "A", "")).await.unwrap();
        let err = store.put_chunks("a", &[Chunk::new("b", 0, "x")]).await.unwrap_err();
        assert!(matches!(err, RagError::Store { .. }));
    }

    #[tokio::test]
    async fn chunks_follow_requested_document_order() {
        let store = InMemoryChunkStore::new();
        for id in ["a", "b"] {
            store.put_document(&Document::from_text(id, id, "")).await.unwrap();
            store
                .put_chunks(id, &[Chunk::new(id, 1, "second"), Chunk::new(id, 0, "first")])
                .await
                .unwrap();
        }
        let ids: Vec<String> = store
            .chunks_for_documents(&["b", "missing", "a"])
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["b_0", "b_1", "a_0", "a_1"]);
    }

    #[tokio::test]
    async fn re_putting_document_keeps_chunks() {
        let store = InMemoryChunkStore::new();
        let mut doc = Document::from_text("a", "Old", "");
        store.put_document(&doc).await.unwrap();
        store.put_chunks("a", &[Chunk::new("a", 0, "x")]).await.unwrap();
        doc.title = "New".into();
        store.put_document(&doc).await.unwrap();

        let listed = store.list_documents().await.unwrap();
        assert_eq!(listed[0].title, "New");
        assert_eq!(store.chunks_for_documents(&["a"]).await.unwrap().len(), 1);
    }
}
