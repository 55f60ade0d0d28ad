//! Shared fixtures for router-level tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tower::util::ServiceExt;

use oracle_relay::app_state::{AppState, PromptSettings};
use oracle_relay::models::generation::{ImageOptions, ImageSize};
use oracle_relay::routes::build_router;
use oracle_relay::services::store::JobStore;
use oracle_relay::services::upstream::{GenerationClient, UpstreamError};

pub const SYSTEM_ROLE: &str = "You are a test wizard.";
pub const DEFAULT_PROMPT: &str = "Make me a spell.";

/// Scripted upstream. Chat calls echo their input; image calls wait for
/// `release` and then answer with `image_reply`.
pub struct MockUpstream {
    pub release: Notify,
    pub image_reply: Result<String, String>,
    pub chat_failure: Option<String>,
    pub spell: serde_json::Value,
}

impl MockUpstream {
    pub fn new(image_reply: Result<&str, &str>) -> Self {
        Self {
            release: Notify::new(),
            image_reply: image_reply.map(str::to_string).map_err(str::to_string),
            chat_failure: None,
            spell: serde_json::json!({
                "name": "Emberlight",
                "incantation": "Ignis parvus",
                "effect": "A small warm flame hovers over your palm"
            }),
        }
    }

    pub fn failing_chat(message: &str) -> Self {
        Self {
            chat_failure: Some(message.to_string()),
            ..Self::new(Ok("https://img/unused"))
        }
    }
}

#[async_trait]
impl GenerationClient for MockUpstream {
    async fn complete(&self, system: &str, user: &str) -> Result<String, UpstreamError> {
        if let Some(message) = &self.chat_failure {
            return Err(UpstreamError::Api(message.clone()));
        }
        Ok(format!("[{}] {}", system, user))
    }

    async fn complete_structured(
        &self,
        _system: &str,
        _user: &str,
        _schema_name: &str,
        _schema: &serde_json::Value,
    ) -> Result<serde_json::Value, UpstreamError> {
        if let Some(message) = &self.chat_failure {
            return Err(UpstreamError::Api(message.clone()));
        }
        Ok(self.spell.clone())
    }

    async fn generate_image(
        &self,
        _prompt: &str,
        _options: &ImageOptions,
    ) -> Result<String, UpstreamError> {
        self.release.notified().await;
        self.image_reply.clone().map_err(UpstreamError::Api)
    }
}

pub struct TestApp {
    pub router: Router,
    pub upstream: Arc<MockUpstream>,
    pub jobs: Arc<JobStore>,
}

pub fn test_app(upstream: MockUpstream) -> TestApp {
    test_app_with(upstream, 100, Duration::from_secs(5))
}

pub fn test_app_with(upstream: MockUpstream, max_jobs: usize, deadline: Duration) -> TestApp {
    let upstream = Arc::new(upstream);
    let jobs = Arc::new(JobStore::new(max_jobs));
    let prompts = PromptSettings {
        system_role: SYSTEM_ROLE.to_string(),
        default_prompt: DEFAULT_PROMPT.to_string(),
        image_size: ImageSize::Square1024,
    };
    let state = AppState::new(Arc::clone(&jobs), upstream.clone(), prompts, deadline);

    TestApp {
        router: build_router(state, None),
        upstream,
        jobs,
    }
}

/// Issue a request against the router and return status, headers and body.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("origin", "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, headers, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    send(router, "GET", uri).await
}

/// Poll the status route until the job leaves `pending`.
pub async fn poll_until_finished(router: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, _, body) = get(router, &format!("/api/image/{}", job_id)).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "pending" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {} never finished", job_id);
}
