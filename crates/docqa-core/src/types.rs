//! Core types for docqa.
//!
//! ## Documents and chunks
//! - [`Document`]: a stored source document
//! - [`Chunk`]: a stored text segment with its embedding
//! - [`NewChunk`]: a pending chunk row awaiting insertion
//! - [`RetrievedChunk`]: a chunk returned by similarity search
//!
//! ## Jobs
//! - [`JobStatus`]: lifecycle state of an ingestion job
//! - [`JobProgress`]: the record polled by external callers
//!
//! ## Answering
//! - [`AnswerEvent`]: one element of a streamed answer
//!
//! ## Configuration
//! - [`ChunkConfig`], [`BatchConfig`], [`RetrievalConfig`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Documents and chunks
// ============================================================================

/// A stored source document. Deleting a document cascades to its chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: Uuid,
    /// Display name (original filename)
    pub name: String,
    /// When the document was ingested
    pub created_at: DateTime<Utc>,
}

/// Metadata carried by every chunk, used only for citation display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Display name of the source document (not a foreign key)
    pub source: String,
}

/// A stored text segment with its embedding. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Store-assigned identifier
    pub id: Uuid,
    /// Owning document
    pub document_id: Uuid,
    /// Segment text
    pub content: String,
    /// Embedding vector; dimensionality is fixed per store
    pub embedding: Vec<f32>,
    /// Citation metadata
    pub metadata: ChunkMetadata,
}

/// A pending chunk row, accumulated by the ingestion pipeline before insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChunk {
    /// Owning document
    pub document_id: Uuid,
    /// Segment text
    pub content: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Citation metadata
    pub metadata: ChunkMetadata,
}

/// A chunk returned by similarity search, with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk identifier
    pub id: Uuid,
    /// Segment text
    pub content: String,
    /// Citation metadata
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query, higher is more similar
    pub similarity: f32,
}

// ============================================================================
// Jobs
// ============================================================================

/// Lifecycle state of an ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Upload received, file not yet staged
    Uploading,
    /// Pipeline is running
    Processing,
    /// Terminal: all chunks persisted
    Complete,
    /// Terminal: pipeline failed
    Error,
    /// Returned for unknown job ids
    NotFound,
}

/// Progress record for one ingestion job.
///
/// Written only by the pipeline task that owns the job; read-only to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    /// Job identifier, generated at submission time
    pub job_id: Uuid,
    /// Current lifecycle state
    pub status: JobStatus,
    /// Integer percentage, 0-100, non-decreasing except on reset-to-error
    pub progress: u8,
    /// Human-readable phase message
    pub message: String,
    /// Number of chunks produced by the chunker
    pub total_chunks: usize,
    /// Number of chunks persisted so far
    pub processed_chunks: usize,
    /// Original filename
    pub filename: String,
}

impl JobProgress {
    /// Create the initial record for a freshly submitted job.
    #[must_use]
    pub fn new(job_id: Uuid, filename: impl Into<String>) -> Self {
        Self {
            job_id,
            status: JobStatus::Uploading,
            progress: 0,
            message: "Uploading file...".to_string(),
            total_chunks: 0,
            processed_chunks: 0,
            filename: filename.into(),
        }
    }

    /// The record returned for an unknown job id.
    #[must_use]
    pub fn not_found(job_id: Uuid) -> Self {
        Self {
            job_id,
            status: JobStatus::NotFound,
            progress: 0,
            message: String::new(),
            total_chunks: 0,
            processed_chunks: 0,
            filename: String::new(),
        }
    }
}

// ============================================================================
// Answering
// ============================================================================

/// One element of a streamed answer.
///
/// Serializes to the wire shape consumed by SSE frontends:
/// `{"type":"sources","content":[..]}`, `{"type":"token","content":".."}`,
/// `{"type":"done"}`, `{"type":"error","content":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// Deduplicated source document names, emitted before any token
    Sources(Vec<String>),
    /// One answer token
    Token(String),
    /// Clean end of stream; nothing follows
    Done,
    /// Terminal failure; nothing follows
    Error(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Chunking parameters (units are characters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Target chunk size
    pub chunk_size: usize,
    /// Overlap shared between adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 150,
        }
    }
}

/// Batch sizes used by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Texts per embedding round trip
    pub embed_batch_size: usize,
    /// Rows per store insert (smaller: embedding vectors make rows heavy)
    pub insert_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            embed_batch_size: 100,
            insert_batch_size: 50,
        }
    }
}

/// Retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum chunks to retrieve
    pub top_k: usize,
    /// Minimum cosine similarity; chunks below are excluded entirely
    pub threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.2,
        }
    }
}
