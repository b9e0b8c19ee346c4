//! Upload submission.
//!
//! Staging happens on the caller's task so a disk failure is reported
//! synchronously; everything after that runs in a spawned task and reports
//! through the job tracker.

use docqa_core::JobStatus;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::pipeline::IngestPipeline;
use crate::progress::JobTracker;

/// Accepts uploads and runs the pipeline in the background.
pub struct IngestService {
    pipeline: Arc<IngestPipeline>,
    tracker: JobTracker,
    staging_dir: PathBuf,
}

impl IngestService {
    /// Create a service staging files under `staging_dir`.
    pub fn new(pipeline: Arc<IngestPipeline>, tracker: JobTracker, staging_dir: PathBuf) -> Self {
        Self {
            pipeline,
            tracker,
            staging_dir,
        }
    }

    /// Stage an upload and start processing it.
    ///
    /// Returns the job id as soon as the bytes are on disk; poll the tracker
    /// for everything after that. The staged filename carries the job id so
    /// two uploads of the same file never collide.
    pub async fn submit(&self, filename: &str, bytes: &[u8]) -> docqa_core::Result<Uuid> {
        let job_id = Uuid::new_v4();
        self.tracker.create(job_id, filename).await;

        let staged = self.staging_dir.join(format!("temp_{job_id}_{filename}"));
        if let Err(err) = tokio::fs::write(&staged, bytes).await {
            self.tracker
                .update(job_id, |p| {
                    p.status = JobStatus::Error;
                    p.message = err.to_string();
                })
                .await;
            return Err(err.into());
        }

        self.tracker
            .update(job_id, |p| {
                p.status = JobStatus::Processing;
                p.progress = 10;
                p.message = "File uploaded, starting processing...".to_string();
            })
            .await;

        debug!("staged {} as {:?}", filename, staged);

        let pipeline = Arc::clone(&self.pipeline);
        let filename = filename.to_string();
        tokio::spawn(async move {
            pipeline.run(job_id, &filename, &staged).await;
        });

        Ok(job_id)
    }

    /// Current progress for a job.
    pub async fn status(&self, job_id: Uuid) -> docqa_core::JobProgress {
        self.tracker.get(job_id).await
    }
}
