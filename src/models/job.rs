use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an image-generation job.
///
/// The payload of each variant is the only place a result or an error
/// message can live, so a `complete` job always has its url and an `error`
/// job always has its message. Serializes to the external shape
/// `{"status": "...", "url"?: ..., "error"?: ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Complete {
        url: String,
    },
    Error {
        #[serde(rename = "error")]
        message: String,
    },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Complete { .. } => "complete",
            JobState::Error { .. } => "error",
        }
    }
}

/// Terminal outcome written by the job runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Complete { url: String },
    Error { message: String },
}

impl From<JobOutcome> for JobState {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Complete { url } => JobState::Complete { url },
            JobOutcome::Error { message } => JobState::Error { message },
        }
    }
}

/// A tracked image-generation request.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: JobState::Pending,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Generate a job identifier: millisecond timestamp in hex, then a random
/// v4 UUID so ids created within the same millisecond stay distinct.
pub fn generate_job_id() -> String {
    format!(
        "{:x}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
