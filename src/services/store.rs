use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::job::{Job, JobOutcome};

/// In-memory job table shared by the job runner and the status routes.
///
/// Every mutation replaces a record's fields inside one write-locked section,
/// so a concurrent reader sees either the old record or the new one.
pub struct JobStore {
    jobs: RwLock<HashMap<String, Job>>,
    max_jobs: usize,
}

impl JobStore {
    pub fn new(max_jobs: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            max_jobs,
        }
    }

    /// Register a new job in the `pending` state.
    pub async fn create(&self, id: &str) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;

        if jobs.contains_key(id) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
        if jobs.len() >= self.max_jobs {
            return Err(StoreError::Full(self.max_jobs));
        }

        let job = Job::pending(id);
        jobs.insert(id.to_string(), job.clone());
        metrics::gauge!("generation_jobs_tracked").set(jobs.len() as f64);

        Ok(job)
    }

    /// Move a pending job to its terminal state.
    pub async fn update(&self, id: &str, outcome: JobOutcome) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;

        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownId(id.to_string()))?;

        if job.state.is_terminal() {
            return Err(StoreError::AlreadyTerminal(id.to_string()));
        }

        job.state = outcome.into();
        job.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Snapshot of a job, or `None` if the id was never issued (or swept).
    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Drop finished jobs older than `retention`. Pending jobs are kept.
    /// Returns the number of records removed.
    pub async fn sweep(&self, retention: Duration) -> usize {
        let Some(cutoff) = TimeDelta::from_std(retention)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at {
            Some(finished_at) => finished_at > cutoff,
            None => true,
        });
        metrics::gauge!("generation_jobs_tracked").set(jobs.len() as f64);

        before - jobs.len()
    }
}

/// Periodically sweep finished jobs out of `store`. A zero `interval` is
/// raised to one millisecond.
pub fn spawn_sweeper(
    store: Arc<JobStore>,
    retention: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        loop {
            ticker.tick().await;
            let removed = store.sweep(retention).await;
            if removed > 0 {
                tracing::info!(removed, "Swept finished jobs");
            }
        }
    })
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Job id already exists: {0}")]
    DuplicateId(String),

    #[error("Job not found: {0}")]
    UnknownId(String),

    #[error("Job already finished: {0}")]
    AlreadyTerminal(String),

    #[error("Job store is full ({0} jobs)")]
    Full(usize),
}
