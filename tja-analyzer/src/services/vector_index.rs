//! Vector-store collaborator
//!
//! The store embeds a text summary of each camera and its history. This
//! side only posts the source; embedding happens remotely.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tja_common::CameraSource;

use crate::error::AnalyzerError;
use crate::types::VectorIndex;

/// Payload for `POST /addTrafficEntry/{id}`
#[derive(Serialize)]
struct TrafficEntryPayload<'a> {
    #[serde(flatten)]
    source: &'a CameraSource,
    summary: String,
}

/// HTTP client for the vector-store service
pub struct HttpVectorIndex {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpVectorIndex {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalyzerError::VectorIndex(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn upsert(&self, source: &CameraSource) -> Result<bool, AnalyzerError> {
        let url = format!("{}/addTrafficEntry/{}", self.base_url, source.id);
        let payload = TrafficEntryPayload {
            source,
            summary: source.traffic_summary(),
        };

        tracing::debug!(source_id = source.id, history = source.results.len(), "Posting source to vector store");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AnalyzerError::VectorIndex(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::VectorIndex(format!(
                "vector store returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<bool>()
            .await
            .map_err(|e| AnalyzerError::VectorIndex(format!("invalid ack: {e}")))
    }
}

/// Stand-in used when no vector store is configured
pub struct DisabledVectorIndex;

#[async_trait]
impl VectorIndex for DisabledVectorIndex {
    async fn upsert(&self, source: &CameraSource) -> Result<bool, AnalyzerError> {
        tracing::trace!(source_id = source.id, "Vector store disabled, skipping upsert");
        Ok(true)
    }
}
