//! Core types and traits shared across docqa crates.
//!
//! - [`types`]: data model (documents, chunks, job progress, answer events)
//! - [`traits`]: the trait seams between pipeline stages and their providers
//! - [`error`]: per-concern error enums and the aggregate [`Error`]
//! - [`retry`]: explicit retry policy used by the ingestion pipeline

pub mod error;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::{EmbedError, Error, ExtractError, LlmError, Result, StoreError};
pub use retry::RetryPolicy;
pub use traits::{Chunker, DocumentStore, Embedder, Extractor, LanguageModel, TokenStream};
pub use types::{
    AnswerEvent, BatchConfig, Chunk, ChunkConfig, ChunkMetadata, Document, JobProgress, JobStatus,
    NewChunk, RetrievalConfig, RetrievedChunk,
};
