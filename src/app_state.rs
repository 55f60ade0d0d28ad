use std::sync::Arc;

use crate::services::{runner::JobRunner, store::JobStore, upstream::GenerationClient};

/// Prompt settings shared by the chat routes.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub system_role: String,
    pub default_prompt: String,
    pub image_size: crate::models::generation::ImageSize,
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobStore>,
    pub runner: JobRunner,
    pub upstream: Arc<dyn GenerationClient>,
    pub prompts: Arc<PromptSettings>,
}

impl AppState {
    pub fn new(
        jobs: Arc<JobStore>,
        upstream: Arc<dyn GenerationClient>,
        prompts: PromptSettings,
        job_deadline: std::time::Duration,
    ) -> Self {
        let runner = JobRunner::new(Arc::clone(&jobs), Arc::clone(&upstream), job_deadline);
        Self {
            jobs,
            runner,
            upstream,
            prompts: Arc::new(prompts),
        }
    }
}
