//! Configuration handling for docqa.
//!
//! Loaded from `~/.config/docqa/config.toml` when present; every field has a
//! default so an empty or missing file works.

use directories::ProjectDirs;
use docqa_core::{BatchConfig, ChunkConfig, RetrievalConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Embedding-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Texts per embedding request
    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_embed_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embed_batch_size(),
        }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model to use for answer generation
    #[serde(default = "default_llm_model")]
    pub model: String,
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
        }
    }
}

/// Chunking-related configuration (units are characters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    800
}

fn default_overlap() -> usize {
    150
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

/// Retrieval-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Maximum chunks per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_top_k() -> usize {
    3
}

fn default_threshold() -> f32 {
    0.2
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            threshold: default_threshold(),
        }
    }
}

/// Ingestion-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Rows per database insert
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Staging directory for uploads (default: XDG cache dir)
    pub staging_dir: Option<PathBuf>,
}

fn default_insert_batch_size() -> usize {
    50
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            insert_batch_size: default_insert_batch_size(),
            staging_dir: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self, docqa_core::Error> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path, or defaults when `None`.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, docqa_core::Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| docqa_core::Error::Config(format!("{}: {e}", path.display())))
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("DOCQA_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.toml"));
        }
        ProjectDirs::from("", "", "docqa").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Sample configuration file with all defaults spelled out.
    pub fn sample_toml() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| "# failed to render sample".to_string())
    }

    /// Chunking parameters in core form.
    #[must_use]
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunking.chunk_size,
            overlap: self.chunking.overlap,
        }
    }

    /// Batch sizes in core form.
    #[must_use]
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            embed_batch_size: self.embedding.batch_size,
            insert_batch_size: self.ingest.insert_batch_size,
        }
    }

    /// Retrieval parameters in core form.
    #[must_use]
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            top_k: self.retrieval.top_k,
            threshold: self.retrieval.threshold,
        }
    }

    /// Staging directory for uploads: configured value or the XDG cache dir.
    pub fn staging_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.ingest.staging_dir {
            return Some(dir.clone());
        }
        ProjectDirs::from("", "", "docqa").map(|dirs| dirs.cache_dir().join("staging"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.embedding.batch_size, 100);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.overlap, 150);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.ingest.insert_batch_size, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chunking]
            chunk_size = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.overlap, 150);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_sample_toml_parses_back() {
        let sample = Config::sample_toml();
        let parsed: Config = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.embedding.dimension, 1536);
    }

    #[test]
    fn test_core_conversions() {
        let config = Config::default();
        assert_eq!(config.chunk_config().chunk_size, 800);
        assert_eq!(config.batch_config().embed_batch_size, 100);
        assert!((config.retrieval_config().threshold - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.chunking.chunk_size, 800);
    }
}
