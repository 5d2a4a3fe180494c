//! Ollama vision model client
//!
//! Non-streaming `POST /api/chat` with a single user message carrying the
//! prompt and, when present, the JPEG snapshot as base64.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::types::ModelClient;

/// Model backend errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot connect to model server at {0}")]
    Connection(String),

    #[error("Model server returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama HTTP client
pub struct OllamaClient {
    base_url: String,
    model: String,
    http_client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http_client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ModelError::Connection(self.base_url.clone())
        } else {
            ModelError::HttpClient(e.to_string())
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn complete(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError> {
        let url = format!("{}/api/chat", self.base_url);

        let images = match image {
            Some(bytes) if !bytes.is_empty() => vec![BASE64.encode(bytes)],
            _ => Vec::new(),
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images,
            }],
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        tracing::debug!(model = %self.model, url = %url, "Sending model request");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::ResponseParsing(e.to_string())
            }
        })?;

        Ok(parsed.message.map(|m| m.content).unwrap_or_default())
    }
}
