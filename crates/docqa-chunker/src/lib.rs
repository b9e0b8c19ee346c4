//! Text chunking for docqa.

pub mod recursive;

pub use recursive::RecursiveChunker;
