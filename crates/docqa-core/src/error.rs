//! Error types for docqa.

use thiserror::Error;

/// Main error type for docqa operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Text extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Language model call failed
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Text extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedding provider errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed response: {0}")]
    Response(String),
}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("insert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

/// Language model provider errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Result type alias for docqa operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_display() {
        let err = ExtractError::UnsupportedType("application/zip".to_string());
        assert_eq!(err.to_string(), "unsupported file type: application/zip");

        let err = ExtractError::Decode("invalid UTF-8".to_string());
        assert_eq!(err.to_string(), "decode error: invalid UTF-8");
    }

    #[test]
    fn test_embed_error_display() {
        let err = EmbedError::Provider("429 Too Many Requests".to_string());
        assert_eq!(err.to_string(), "provider error: 429 Too Many Requests");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Insert("connection reset".to_string());
        assert_eq!(err.to_string(), "insert failed: connection reset");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::Stream("connection closed mid-stream".to_string());
        assert_eq!(err.to_string(), "stream error: connection closed mid-stream");
    }

    #[test]
    fn test_error_from_extract_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let extract_err: ExtractError = io_err.into();
        let err: Error = extract_err.into();

        assert!(matches!(err, Error::Extraction(ExtractError::Io(_))));
        assert!(err.to_string().contains("extraction error"));
    }

    #[test]
    fn test_error_from_store_error() {
        let store_err = StoreError::Query("timeout".to_string());
        let err: Error = store_err.into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_error_other_display() {
        let err = Error::Other("unexpected condition".to_string());
        assert_eq!(err.to_string(), "unexpected condition");
    }
}
