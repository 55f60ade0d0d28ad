use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Longest prompt accepted from a query string.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Image sizes accepted by the image-generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    #[strum(serialize = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    #[strum(serialize = "512x512")]
    Square512,
    #[serde(rename = "1024x1024")]
    #[strum(serialize = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    #[strum(serialize = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    #[strum(serialize = "1024x1792")]
    Portrait,
}

/// Options forwarded with an image-generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub size: ImageSize,
}

/// Query for the chat endpoints (`?userInput=`).
#[derive(Debug, Deserialize, Validate)]
pub struct PromptQuery {
    #[serde(rename = "userInput")]
    #[garde(length(chars, max = MAX_PROMPT_CHARS))]
    pub user_input: Option<String>,
}

impl PromptQuery {
    /// The user's text, or `fallback` when it is absent or empty.
    pub fn prompt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.user_input.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => fallback,
        }
    }
}

/// Query for job creation (`?prompt=&size=`).
#[derive(Debug, Deserialize, Validate)]
pub struct ImageQuery {
    #[serde(default)]
    #[garde(length(chars, min = 1, max = MAX_PROMPT_CHARS))]
    pub prompt: String,

    #[garde(skip)]
    pub size: Option<ImageSize>,
}

/// Response for a plain chat completion.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response after creating an image-generation job.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobCreatedResponse {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: String,
}

/// Shape the structured-output endpoint asks the model to fill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spell {
    pub name: String,
    pub incantation: String,
    pub effect: String,
}

impl Spell {
    /// JSON schema sent as the `response_format` of a structured completion.
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "incantation": { "type": "string" },
                "effect": { "type": "string" }
            },
            "required": ["name", "incantation", "effect"],
            "additionalProperties": false
        })
    }
}
