//! Similarity retrieval.

use docqa_core::{DocumentStore, Embedder, RetrievalConfig, RetrievedChunk};
use std::sync::Arc;
use tracing::debug;

/// Embeds a question and fetches the closest stored chunks.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    config: RetrievalConfig,
}

impl Retriever {
    /// Create a retriever with the default top-k and threshold.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            embedder,
            store,
            config: RetrievalConfig::default(),
        }
    }

    /// Override the retrieval parameters.
    #[must_use]
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Chunks most similar to the question, best first. May be empty when
    /// nothing clears the similarity threshold.
    pub async fn retrieve(&self, question: &str) -> docqa_core::Result<Vec<RetrievedChunk>> {
        let embedding = self.embedder.embed_one(question).await?;
        let hits = self
            .store
            .similarity_search(&embedding, self.config.threshold, self.config.top_k)
            .await?;
        debug!("retrieved {} chunks for question", hits.len());
        Ok(hits)
    }
}
