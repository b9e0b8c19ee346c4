//! Document and vector storage for docqa.

pub mod memory;

pub use memory::MemoryStore;
