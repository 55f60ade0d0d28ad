use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// OpenAI API key
    pub openai_api_key: String,

    /// Base URL of the OpenAI-compatible REST API
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Default image size when the request does not name one
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// System message sent ahead of every chat completion
    #[serde(default = "default_system_role")]
    pub system_role: String,

    /// Prompt used when a chat request carries no `userInput`
    #[serde(default = "default_prompt")]
    pub default_prompt: String,

    /// Per-request timeout on the HTTP client
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// A job still pending after this long is failed with a timeout
    #[serde(default = "default_job_deadline_secs")]
    pub job_deadline_secs: u64,

    /// How long finished jobs stay queryable
    #[serde(default = "default_job_retention_secs")]
    pub job_retention_secs: u64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on tracked jobs; creation fails beyond it
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_system_role() -> String {
    "You are a wizard who holds ancient wisdom. You inspire people through \
     magical incantations and mysterious tales."
        .to_string()
}

fn default_prompt() -> String {
    "Create a magic spell that is mine alone.".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    60
}

fn default_job_deadline_secs() -> u64 {
    120
}

fn default_job_retention_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_jobs() -> usize {
    10_000
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn job_deadline(&self) -> Duration {
        Duration::from_secs(self.job_deadline_secs)
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    /// Sweep period, never shorter than one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
