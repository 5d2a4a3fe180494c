//! Per-camera analysis pipeline
//!
//! fetch snapshot → ask the model → parse cascade → (optional) field
//! recovery → timestamped outcome.

use async_trait::async_trait;
use std::sync::Arc;
use tja_common::AnalysisOutcome;
use tracing::{error, info, warn};

use crate::error::AnalyzerError;
use crate::parser;
use crate::services::prober::FieldRecoveryProber;
use crate::services::prompts::ANALYSIS_PROMPT;
use crate::types::{ImageFetcher, ModelClient, SourceAnalyzer};

pub struct AnalysisOrchestrator {
    fetcher: Arc<dyn ImageFetcher>,
    model: Arc<dyn ModelClient>,
    image_base_url: String,
    /// Present only when field recovery was opted into
    prober: Option<FieldRecoveryProber>,
}

impl AnalysisOrchestrator {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, model: Arc<dyn ModelClient>, image_base_url: &str) -> Self {
        Self {
            fetcher,
            model,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            prober: None,
        }
    }

    /// Fall back to per-field queries when the cascade declines
    pub fn with_field_recovery(mut self) -> Self {
        self.prober = Some(FieldRecoveryProber::new(Arc::clone(&self.model)));
        self
    }

    pub fn field_recovery_enabled(&self) -> bool {
        self.prober.is_some()
    }

    /// Canonical snapshot URL for a camera identifier
    pub fn image_url(&self, identifier: &str) -> String {
        format!("{}/{}.jpg", self.image_base_url, identifier)
    }
}

#[async_trait]
impl SourceAnalyzer for AnalysisOrchestrator {
    async fn analyze(&self, identifier: &str) -> Result<AnalysisOutcome, AnalyzerError> {
        let image_url = self.image_url(identifier);
        info!(identifier = %identifier, "Analyzing camera");

        // A missing snapshot still goes to the model; the reply decides
        let image = match self.fetcher.fetch(&image_url).await {
            Ok(bytes) => {
                info!(url = %image_url, bytes = bytes.len(), "Image downloaded");
                bytes
            }
            Err(e) => {
                error!(url = %image_url, error = %e, "Error downloading image, continuing without it");
                Vec::new()
            }
        };

        let content = self.model.complete(ANALYSIS_PROMPT, Some(&image)).await?;

        if content.is_empty() {
            warn!(identifier = %identifier, "No content received from model");
            return Ok(AnalysisOutcome::empty(image_url));
        }

        info!(identifier = %identifier, content = %content, "Content received");

        if let Some(matched) = parser::parse_response(&content) {
            info!(
                identifier = %identifier,
                strategy = matched.strategy.as_str(),
                title = %matched.reading.title,
                traffic = matched.reading.traffic,
                "Analysis result created"
            );
            return Ok(AnalysisOutcome::matched(image_url, matched.reading));
        }

        let Some(prober) = &self.prober else {
            warn!(identifier = %identifier, "Content could not be parsed into a reading");
            return Ok(AnalysisOutcome::empty(image_url));
        };

        info!(identifier = %identifier, "Parse strategies declined, querying fields individually");
        match prober.probe(&image).await? {
            Some(reading) => Ok(AnalysisOutcome::matched(image_url, reading)),
            None => {
                warn!(identifier = %identifier, "Field recovery returned incomplete reading");
                Ok(AnalysisOutcome::empty(image_url))
            }
        }
    }
}
