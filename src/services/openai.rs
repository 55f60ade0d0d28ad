use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::generation::ImageOptions;
use crate::services::upstream::{GenerationClient, UpstreamError};

/// Client for the OpenAI chat-completion and image-generation APIs.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    image_model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        chat_model: &str,
        image_model: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            chat_model: chat_model.to_string(),
            image_model: image_model.to_string(),
        })
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<String, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Api(api_error_message(status, &body)));
        }

        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Malformed("completion has no content".to_string()))
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            response_format: None,
        };

        self.chat(&request).await
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, UpstreamError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            response_format: Some(json_schema_format(schema_name, schema)),
        };

        let text = self.chat(&request).await?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/images/generations", self.base_url);

        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: options.size.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Api(api_error_message(status, &body)));
        }

        let images: ImageResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        images
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or_else(|| UpstreamError::Malformed("image response has no url".to_string()))
    }
}

/// `response_format` payload requesting strict JSON-schema output.
fn json_schema_format(name: &str, schema: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "strict": true,
            "schema": schema
        }
    })
}

/// Pull the human-readable message out of an OpenAI error body, falling
/// back to the HTTP status when the body is not the documented shape.
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("upstream returned {}", status),
    }
}
