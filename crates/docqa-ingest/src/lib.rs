//! Document ingestion for docqa.
//!
//! [`IngestService`] stages an upload, registers a job with the
//! [`JobTracker`], and spawns the [`IngestPipeline`] in the background.
//! Callers poll the tracker for progress; the submit call itself returns as
//! soon as the file is staged.

pub mod pipeline;
pub mod progress;
pub mod service;

pub use pipeline::IngestPipeline;
pub use progress::JobTracker;
pub use service::IngestService;
