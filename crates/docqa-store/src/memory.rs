//! In-memory document store.
//!
//! Keeps documents and chunks behind a single `RwLock` and answers similarity
//! queries by brute-force cosine scan. Suitable for development, tests, and
//! modest corpora; everything is lost on shutdown.

use async_trait::async_trait;
use chrono::Utc;
use docqa_core::{Chunk, Document, DocumentStore, NewChunk, RetrievedChunk, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    // Insertion order is kept so equal-similarity results come back in a
    // stable order
    chunks: Vec<Chunk>,
}

/// In-memory vector store with brute-force similarity search.
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Cosine similarity; mismatched dimensions and zero vectors score 0.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, name: &str) -> Result<Document, StoreError> {
        let document = Document {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.documents.insert(document.id, document.clone());
        debug!("inserted document {} ({})", document.name, document.id);
        Ok(document)
    }

    async fn insert_chunks(&self, rows: &[NewChunk]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for row in rows {
            inner.chunks.push(Chunk {
                id: Uuid::new_v4(),
                document_id: row.document_id,
                content: row.content.clone(),
                embedding: row.embedding.clone(),
                metadata: row.metadata.clone(),
            });
        }
        debug!("inserted {} chunks", rows.len());
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut documents: Vec<Document> = inner.documents.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete_document(&self, id: Uuid) -> Result<Option<u64>, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.documents.remove(&id).is_none() {
            return Ok(None);
        }

        let before = inner.chunks.len();
        inner.chunks.retain(|chunk| chunk.document_id != id);
        let deleted = (before - inner.chunks.len()) as u64;
        debug!("deleted document {} and {} chunks", id, deleted);
        Ok(Some(deleted))
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        let inner = self.inner.read().await;

        let mut results: Vec<RetrievedChunk> = inner
            .chunks
            .iter()
            .filter_map(|chunk| {
                let similarity = Self::cosine_similarity(embedding, &chunk.embedding);
                (similarity >= threshold).then(|| RetrievedChunk {
                    id: chunk.id,
                    content: chunk.content.clone(),
                    metadata: chunk.metadata.clone(),
                    similarity,
                })
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }
}
