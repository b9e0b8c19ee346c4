//! Trait seams between pipeline stages and their providers.
//!
//! - [`Extractor`]: turn a document file into plain text
//! - [`Chunker`]: split extracted text into retrieval-sized chunks
//! - [`Embedder`]: turn text into fixed-dimension vectors
//! - [`DocumentStore`]: persist documents/chunks and run similarity queries
//! - [`LanguageModel`]: complete a prompt, materialized or token by token
//!
//! Implementations are swappable without touching the pipeline; tests supply
//! in-process mocks for all of them.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::Path;
use uuid::Uuid;

use crate::error::{EmbedError, ExtractError, LlmError, StoreError};
use crate::types::{Document, NewChunk, RetrievedChunk};

/// Incremental token sequence from a language model.
///
/// The stream ends cleanly when the provider signals completion; a provider
/// failure after tokens have been emitted surfaces as an `Err` item so the
/// consumer can tell a partial answer from a finished one.
pub type TokenStream = BoxStream<'static, Result<String, LlmError>>;

// ============================================================================
// Extraction
// ============================================================================

/// Trait for extracting plain text from a document file.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Check whether this extractor handles the given file.
    fn can_extract(&self, path: &Path) -> bool;

    /// Extract the full plain-text content of the file.
    ///
    /// Fails with an IO/decode error when the file cannot be opened or
    /// decoded; extraction is never retried.
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

// ============================================================================
// Chunking
// ============================================================================

/// Trait for splitting extracted text into chunks.
#[async_trait]
pub trait Chunker: Send + Sync {
    /// Name of this chunking strategy.
    fn name(&self) -> &str;

    /// Split text into retrieval-sized chunks, in document order.
    async fn split(&self, text: &str) -> Vec<String>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings via an external provider.
///
/// The client performs no retries of its own; transport errors propagate to
/// the caller, which decides whether to retry.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts in one provider round trip.
    ///
    /// Order-preserving: output index `i` corresponds to input index `i`.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single text (used for query embeddings).
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vectors = self.embed_many(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Response("empty embedding response".to_string()))
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Trait for the vector-capable document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document record and return it with its generated id.
    async fn insert_document(&self, name: &str) -> Result<Document, StoreError>;

    /// Insert a batch of chunk rows.
    async fn insert_chunks(&self, rows: &[NewChunk]) -> Result<(), StoreError>;

    /// List all documents.
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError>;

    /// Delete a document and all its chunks.
    ///
    /// Returns the number of deleted chunk rows, or `None` when no document
    /// with that id exists. A document with zero chunks deletes as `Some(0)`,
    /// which callers must not confuse with a miss.
    async fn delete_document(&self, id: Uuid) -> Result<Option<u64>, StoreError>;

    /// Similarity query: chunks with cosine similarity at or above
    /// `threshold`, ordered by descending similarity, truncated to `limit`.
    async fn similarity_search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError>;
}

// ============================================================================
// Language model
// ============================================================================

/// Trait for answer generation via an external language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Complete a prompt and return the full answer text.
    ///
    /// Generation runs at the model's most deterministic setting so repeated
    /// calls with identical context produce reproducible wording.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Complete a prompt as an incremental token stream.
    ///
    /// Tokens are forwarded as soon as the provider produces them; nothing is
    /// buffered ahead of the first token.
    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream, LlmError>;
}
