//! PDF extractor.
//!
//! Uses lopdf to extract text page by page. Pages with no extractable text
//! (image-only pages, blank pages) are skipped silently and contribute
//! nothing to the output, not even a blank line.

use async_trait::async_trait;
use docqa_core::{ExtractError, Extractor};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        debug!("Extracting PDF: {:?}", path);

        let bytes = tokio::fs::read(path).await?;

        // lopdf parsing and text extraction are blocking
        tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| ExtractError::Parse(format!("task join error: {e}")))?
    }
}

/// Extract text from every page, concatenating non-empty pages with `\n`.
fn extract_pages(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::Parse(format!("failed to load PDF: {e}")))?;

    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                let trimmed = page_text.trim();
                if !trimmed.is_empty() {
                    text.push_str(trimmed);
                    text.push('\n');
                }
            }
            Err(e) => {
                // Image-only or malformed pages yield no text
                debug!("no text on page {}: {}", page_num, e);
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_extract_pdf_extension() {
        let extractor = PdfExtractor::new();
        assert!(extractor.can_extract(Path::new("/docs/report.pdf")));
        assert!(extractor.can_extract(Path::new("/docs/REPORT.PDF")));
        assert!(!extractor.can_extract(Path::new("/docs/notes.txt")));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(Path::new("/nonexistent/report.pdf")).await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }

    #[tokio::test]
    async fn test_extract_garbage_bytes_is_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("fake.pdf");
        std::fs::write(&file_path, b"this is not a pdf").unwrap();

        let extractor = PdfExtractor::new();
        let result = extractor.extract(&file_path).await;
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }
}
