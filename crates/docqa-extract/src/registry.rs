//! Extractor registry.
//!
//! Routes a file to the first registered extractor that claims it by
//! extension. Registration order is the match order.

use docqa_core::{ExtractError, Extractor};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of extractors, consulted in registration order.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a registry with the built-in extractors (PDF and plain text).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::PdfExtractor::new()));
        registry.register(Arc::new(crate::TextExtractor::new()));
        registry
    }

    /// Register an extractor.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// Find the first extractor that can handle `path`.
    pub fn get_for_file(&self, path: &Path) -> Option<Arc<dyn Extractor>> {
        self.extractors
            .iter()
            .find(|e| e.can_extract(path))
            .cloned()
    }

    /// Extract text from `path` using the first matching extractor.
    pub async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let extractor = self.get_for_file(path).ok_or_else(|| {
            ExtractError::UnsupportedType(
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("(none)")
                    .to_string(),
            )
        })?;

        debug!("Extracting text from {:?}", path);
        extractor.extract(path).await
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
