//! Plain-text extractor.

use async_trait::async_trait;
use docqa_core::{ExtractError, Extractor};
use std::path::Path;
use tokio::fs;

/// Extractor for plain-text files. Reads the full content verbatim as UTF-8.
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new text extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    fn can_extract(&self, path: &Path) -> bool {
        let extensions = ["txt", "md", "markdown", "text"];
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext.to_lowercase().as_str()))
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        // read_to_string enforces UTF-8; invalid bytes surface as a decode error
        match fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                Err(ExtractError::Decode(format!(
                    "{} is not valid UTF-8",
                    path.display()
                )))
            }
            Err(err) => Err(ExtractError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_can_extract_by_extension() {
        let extractor = TextExtractor::new();
        assert!(extractor.can_extract(Path::new("/docs/notes.txt")));
        assert!(extractor.can_extract(Path::new("/docs/README.md")));
        assert!(extractor.can_extract(Path::new("/docs/NOTES.TXT")));
        assert!(!extractor.can_extract(Path::new("/docs/report.pdf")));
        assert!(!extractor.can_extract(Path::new("/docs/no_extension")));
    }

    #[tokio::test]
    async fn test_extract_reads_verbatim() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("notes.txt");
        let text = "First line\n\nSecond paragraph with ünïcödé.";
        std::fs::write(&file_path, text).unwrap();

        let extractor = TextExtractor::new();
        let content = extractor.extract(&file_path).await.unwrap();
        assert_eq!(content, text);
    }

    #[tokio::test]
    async fn test_extract_empty_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("empty.txt");
        std::fs::write(&file_path, "").unwrap();

        let extractor = TextExtractor::new();
        let content = extractor.extract(&file_path).await.unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let extractor = TextExtractor::new();
        let result = extractor.extract(Path::new("/nonexistent/notes.txt")).await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }

    #[tokio::test]
    async fn test_extract_invalid_utf8_is_decode_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("binary.txt");
        std::fs::write(&file_path, [0xFF, 0xFE, 0x00, 0x80]).unwrap();

        let extractor = TextExtractor::new();
        let result = extractor.extract(&file_path).await;
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }
}
