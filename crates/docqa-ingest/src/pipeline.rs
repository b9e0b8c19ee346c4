//! The ingestion pipeline.
//!
//! Extract, chunk, embed, persist, in that order, updating the job record at
//! fixed breakpoints: 20 after extraction starts, 30 at chunking, 40 when
//! embedding begins, 40-70 across embedding batches, 70-100 across
//! persistence batches, 100 on completion. Any failure flips the job to
//! `Error` and resets the bar to 0; the staged file is removed on every exit
//! path.
//!
//! Persistence is retried per batch; embedding is not, because a provider
//! that rejects a batch will reject its retry too, while transient database
//! errors usually clear within a second.

use docqa_core::{
    BatchConfig, ChunkMetadata, Chunker, DocumentStore, Embedder, JobStatus, NewChunk, RetryPolicy,
};
use docqa_extract::ExtractorRegistry;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::progress::JobTracker;

/// Runs one document through extract, chunk, embed, and persist.
pub struct IngestPipeline {
    registry: Arc<ExtractorRegistry>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    tracker: JobTracker,
    batches: BatchConfig,
    save_retry: RetryPolicy,
    embed_retry: RetryPolicy,
}

impl IngestPipeline {
    /// Create a pipeline with default batch sizes and retry behavior.
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        tracker: JobTracker,
    ) -> Self {
        Self {
            registry,
            chunker,
            embedder,
            store,
            tracker,
            batches: BatchConfig::default(),
            save_retry: RetryPolicy::default(),
            embed_retry: RetryPolicy::none(),
        }
    }

    /// Override the batch sizes.
    #[must_use]
    pub fn with_batches(mut self, batches: BatchConfig) -> Self {
        self.batches = batches;
        self
    }

    /// Override the persistence retry policy.
    #[must_use]
    pub fn with_save_retry(mut self, policy: RetryPolicy) -> Self {
        self.save_retry = policy;
        self
    }

    /// Process a staged file, recording the outcome in the job tracker.
    ///
    /// Never returns an error: failures are captured on the job record so
    /// pollers see them. The staged file is removed before returning.
    pub async fn run(&self, job_id: Uuid, filename: &str, staged: &Path) {
        if let Err(err) = self.process(job_id, filename, staged).await {
            error!("ingestion of {} failed: {}", filename, err);
            self.tracker
                .update(job_id, |p| {
                    p.status = JobStatus::Error;
                    p.progress = 0;
                    p.message = format!("Error: {err}");
                })
                .await;
        }

        match tokio::fs::remove_file(staged).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove staged file {:?}: {}", staged, e),
        }
    }

    async fn process(
        &self,
        job_id: Uuid,
        filename: &str,
        staged: &Path,
    ) -> docqa_core::Result<()> {
        self.tracker
            .update(job_id, |p| {
                p.progress = 20;
                p.message = "Extracting text from document...".to_string();
            })
            .await;
        let text = self.registry.extract(staged).await?;

        self.tracker
            .update(job_id, |p| {
                p.progress = 30;
                p.message = "Splitting into chunks...".to_string();
            })
            .await;
        let chunks = self.chunker.split(&text).await;
        let total = chunks.len();
        debug!("{} chunker produced {} chunks", self.chunker.name(), total);
        self.tracker.update(job_id, |p| p.total_chunks = total).await;

        self.tracker
            .update(job_id, |p| {
                p.progress = 40;
                p.message = format!("Generating embeddings for {total} chunks...");
            })
            .await;

        // The document row exists even when the text produced no chunks
        let document = self.store.insert_document(filename).await?;

        let mut rows: Vec<NewChunk> = Vec::with_capacity(total);
        for batch in chunks.chunks(self.batches.embed_batch_size.max(1)) {
            let vectors = self
                .embed_retry
                .run(|| self.embedder.embed_many(batch))
                .await?;

            for (content, embedding) in batch.iter().zip(vectors) {
                rows.push(NewChunk {
                    document_id: document.id,
                    content: content.clone(),
                    embedding,
                    metadata: ChunkMetadata {
                        source: filename.to_string(),
                    },
                });
            }

            let done = rows.len();
            self.tracker
                .update(job_id, |p| {
                    p.progress = (40 + done * 30 / total) as u8;
                    p.message = format!("Generated {done}/{total} embeddings...");
                })
                .await;
        }

        self.tracker
            .update(job_id, |p| p.message = "Saving to database...".to_string())
            .await;

        let mut saved = 0usize;
        for batch in rows.chunks(self.batches.insert_batch_size.max(1)) {
            self.save_retry
                .run(|| self.store.insert_chunks(batch))
                .await?;

            saved += batch.len();
            let total_rows = rows.len();
            self.tracker
                .update(job_id, |p| {
                    p.progress = (70 + saved * 30 / total_rows) as u8;
                    p.processed_chunks = saved;
                    p.message = format!("Saved {saved}/{total_rows} chunks to database...");
                })
                .await;
        }

        self.tracker
            .update(job_id, |p| {
                p.status = JobStatus::Complete;
                p.progress = 100;
                p.message = format!("Successfully processed {total} chunks!");
            })
            .await;
        info!("ingested {}: {} chunks", filename, total);
        Ok(())
    }
}
