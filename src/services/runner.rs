use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::models::generation::ImageOptions;
use crate::models::job::{generate_job_id, JobOutcome};
use crate::services::store::{JobStore, StoreError};
use crate::services::upstream::GenerationClient;

/// Drives image-generation jobs from `pending` to a terminal state on
/// detached tasks.
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<JobStore>,
    upstream: Arc<dyn GenerationClient>,
    deadline: Duration,
}

impl JobRunner {
    pub fn new(store: Arc<JobStore>, upstream: Arc<dyn GenerationClient>, deadline: Duration) -> Self {
        Self {
            store,
            upstream,
            deadline,
        }
    }

    /// Register a new job and start it. Returns the job id as soon as the
    /// record exists; the upstream call continues in the background.
    pub async fn submit(&self, prompt: String, options: ImageOptions) -> Result<String, StoreError> {
        let id = generate_job_id();

        if let Err(e) = self.store.create(&id).await {
            if matches!(e, StoreError::DuplicateId(_)) {
                tracing::error!(job_id = %id, "Generated job id collided with an existing job");
            }
            return Err(e);
        }

        metrics::counter!("generation_jobs_total").increment(1);
        tracing::info!(job_id = %id, size = %options.size, "Image generation job created");

        self.spawn(id.clone(), prompt, options);
        Ok(id)
    }

    /// Run the upstream call for an already-registered job. Every failure
    /// path ends in a store write; nothing is propagated to the caller.
    pub fn spawn(&self, id: String, prompt: String, options: ImageOptions) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let upstream = Arc::clone(&self.upstream);
        let deadline = self.deadline;

        tokio::spawn(async move {
            let start = Instant::now();
            // Upstream call runs on its own task so a panic surfaces as a JoinError
            let mut call =
                tokio::spawn(async move { upstream.generate_image(&prompt, &options).await });
            let result = tokio::time::timeout(deadline, &mut call).await;
            metrics::histogram!("upstream_request_seconds").record(start.elapsed().as_secs_f64());

            let outcome = match result {
                Ok(Ok(Ok(url))) => {
                    metrics::counter!("generation_jobs_completed").increment(1);
                    tracing::info!(
                        job_id = %id,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Image generation complete"
                    );
                    JobOutcome::Complete { url }
                }
                Ok(Ok(Err(e))) => {
                    metrics::counter!("generation_jobs_failed").increment(1);
                    tracing::warn!(job_id = %id, error = %e, "Image generation failed");
                    JobOutcome::Error {
                        message: e.to_string(),
                    }
                }
                Ok(Err(e)) => {
                    metrics::counter!("generation_jobs_failed").increment(1);
                    tracing::error!(job_id = %id, error = %e, "Image generation task aborted");
                    JobOutcome::Error {
                        message: format!("upstream call aborted: {}", e),
                    }
                }
                Err(_) => {
                    call.abort();
                    metrics::counter!("generation_jobs_failed").increment(1);
                    tracing::warn!(
                        job_id = %id,
                        deadline_secs = deadline.as_secs(),
                        "Image generation timed out"
                    );
                    JobOutcome::Error {
                        message: format!(
                            "upstream call timed out after {}s",
                            deadline.as_secs_f64()
                        ),
                    }
                }
            };

            if let Err(e) = store.update(&id, outcome).await {
                tracing::error!(job_id = %id, error = %e, "Failed to record job outcome");
            }
        })
    }
}
