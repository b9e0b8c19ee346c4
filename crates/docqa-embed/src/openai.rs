//! OpenAI embeddings client.
//!
//! Calls the `/v1/embeddings` endpoint with a batch of texts and returns the
//! vectors in input order. The client itself never retries; callers wrap it
//! in their own retry policy when they want one.

use async_trait::async_trait;
use docqa_core::{EmbedError, Embedder};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSION: usize = 1536;

/// Embedder backed by the OpenAI embeddings API.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    /// Create a client for the default model (`text-embedding-3-small`, 1536
    /// dimensions).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
        }
    }

    /// Override the model and its dimension.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }

    /// Override the API base URL (for proxies and test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("embedding {} texts with {}", texts.len(), self.model);

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Provider(format!("embeddings request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbedError::Provider(format!(
                "embeddings API returned {status}: {text}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Response(format!("malformed embeddings response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedError::Response(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API may return rows out of order; index maps each row back to
        // its input position
        let mut rows = parsed.data;
        rows.sort_by_key(|row| row.index);
        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        let embedder = OpenAiEmbedder::new("sk-test");
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_with_model_overrides() {
        let embedder = OpenAiEmbedder::new("sk-test").with_model("text-embedding-3-large", 3072);
        assert_eq!(embedder.model_name(), "text-embedding-3-large");
        assert_eq!(embedder.dimension(), 3072);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        // No server behind this URL; an empty batch must not hit it
        let embedder = OpenAiEmbedder::new("sk-test").with_base_url("http://127.0.0.1:1");
        let vectors = embedder.embed_many(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_provider_error() {
        let embedder = OpenAiEmbedder::new("sk-test").with_base_url("http://127.0.0.1:1");
        let result = embedder.embed_many(&["hello".to_string()]).await;
        assert!(matches!(result, Err(EmbedError::Provider(_))));
    }
}
