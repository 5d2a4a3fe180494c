//! Camera snapshot download over HTTP

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::types::ImageFetcher;

/// Image download errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Image server returned status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Image download timed out after {0}s")]
    Timeout(u64),
}

/// reqwest-backed snapshot fetcher
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url = %url, "Downloading camera image");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        Ok(bytes.to_vec())
    }
}
