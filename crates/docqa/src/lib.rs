//! Document Q&A service.
//!
//! Wires the docqa component crates into one facade: upload documents, poll
//! ingestion progress, list and delete documents, and ask questions answered
//! from the stored content.

pub mod config;
pub mod service;

pub use config::Config;
pub use service::{DeleteOutcome, DocQaService};
