//! Upstream generation capability.
//!
//! Routes and the job runner talk to the model provider only through
//! [`GenerationClient`], so the OpenAI client can be swapped for a mock in
//! tests.

use async_trait::async_trait;

use crate::models::generation::ImageOptions;

/// Text and image generation backed by a third-party API.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Plain chat completion: one system message, one user message.
    async fn complete(&self, system: &str, user: &str) -> Result<String, UpstreamError>;

    /// Chat completion constrained to the given JSON schema.
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Generate one image and return its URL.
    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<String, UpstreamError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the upstream API; displays its message verbatim.
    #[error("{0}")]
    Api(String),

    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}
