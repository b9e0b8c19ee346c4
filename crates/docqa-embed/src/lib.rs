//! Embedding providers for docqa.

pub mod openai;
pub mod stub;

pub use openai::OpenAiEmbedder;
pub use stub::HashEmbedder;
