//! The docqa service facade.
//!
//! One object owning the full stack: ingestion pipeline with progress
//! tracking, document management, and question answering. Providers are trait
//! objects so tests can run the whole service against in-process fakes.

use docqa_chunker::RecursiveChunker;
use docqa_core::{Document, DocumentStore, Embedder, JobProgress, LanguageModel};
use docqa_extract::ExtractorRegistry;
use docqa_ingest::{IngestPipeline, IngestService, JobTracker};
use docqa_query::{Answer, AnswerGenerator, AnswerStream, Retriever};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Document and its chunks were removed
    Deleted {
        /// Number of chunk rows removed with it
        chunks: u64,
    },
    /// No document with that id
    NotFound,
}

/// Everything the docqa binary (or an embedding application) needs.
pub struct DocQaService {
    ingest: IngestService,
    tracker: JobTracker,
    store: Arc<dyn DocumentStore>,
    generator: AnswerGenerator,
}

impl DocQaService {
    /// Wire the service from providers and configuration.
    ///
    /// Creates the staging directory if it is missing.
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn LanguageModel>,
        staging_dir: PathBuf,
    ) -> docqa_core::Result<Self> {
        std::fs::create_dir_all(&staging_dir)?;

        let tracker = JobTracker::new();
        let pipeline = IngestPipeline::new(
            Arc::new(ExtractorRegistry::with_defaults()),
            Arc::new(RecursiveChunker::new(config.chunk_config())),
            Arc::clone(&embedder),
            Arc::clone(&store),
            tracker.clone(),
        )
        .with_batches(config.batch_config());

        let ingest = IngestService::new(Arc::new(pipeline), tracker.clone(), staging_dir);

        let retriever = Retriever::new(embedder, Arc::clone(&store))
            .with_config(config.retrieval_config());
        let generator = AnswerGenerator::new(retriever, model);

        Ok(Self {
            ingest,
            tracker,
            store,
            generator,
        })
    }

    /// Accept an upload and start processing it in the background.
    pub async fn submit_upload(&self, filename: &str, bytes: &[u8]) -> docqa_core::Result<Uuid> {
        self.ingest.submit(filename, bytes).await
    }

    /// Progress of an ingestion job.
    pub async fn job_status(&self, job_id: Uuid) -> JobProgress {
        self.tracker.get(job_id).await
    }

    /// All stored documents, newest first.
    pub async fn documents(&self) -> docqa_core::Result<Vec<Document>> {
        Ok(self.store.list_documents().await?)
    }

    /// Delete a document and its chunks.
    pub async fn delete_document(&self, id: Uuid) -> docqa_core::Result<DeleteOutcome> {
        match self.store.delete_document(id).await? {
            Some(chunks) => {
                info!("deleted document {} ({} chunks)", id, chunks);
                Ok(DeleteOutcome::Deleted { chunks })
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    /// Answer a question in one call.
    pub async fn ask(&self, question: &str) -> docqa_core::Result<Answer> {
        self.generator.ask(question).await
    }

    /// Answer a question as an event stream (sources, tokens, terminal
    /// done/error).
    pub async fn ask_stream(&self, question: &str) -> AnswerStream {
        self.generator.ask_stream(question).await
    }
}
