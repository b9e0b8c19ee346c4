//! Shared job progress registry.
//!
//! One record per ingestion job, written by the pipeline task that owns the
//! job and polled read-only by status queries. Records are kept for the
//! lifetime of the process; unknown ids answer with a `NotFound` record
//! rather than an error so pollers never have to special-case a job that has
//! not registered yet.

use docqa_core::JobProgress;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cloneable handle to the job registry.
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<Uuid, JobProgress>>>,
}

impl JobTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job in its initial state.
    pub async fn create(&self, job_id: Uuid, filename: &str) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job_id, JobProgress::new(job_id, filename));
    }

    /// Current record for a job; unknown ids get a `NotFound` record.
    pub async fn get(&self, job_id: Uuid) -> JobProgress {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id)
            .cloned()
            .unwrap_or_else(|| JobProgress::not_found(job_id))
    }

    /// Mutate a job's record in place. A no-op for unknown ids.
    pub async fn update<F>(&self, job_id: Uuid, f: F)
    where
        F: FnOnce(&mut JobProgress),
    {
        let mut jobs = self.jobs.write().await;
        if let Some(progress) = jobs.get_mut(&job_id) {
            f(progress);
        }
    }
}
