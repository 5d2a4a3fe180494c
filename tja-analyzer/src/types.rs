//! Collaborator trait definitions for the analyzer
//!
//! The orchestrator and the polling scheduler only see these traits, so the
//! HTTP/SQLite implementations can be swapped for in-memory fakes in tests:
//! - **ImageFetcher:** camera snapshot download
//! - **ModelClient:** vision-capable language model
//! - **SourceRepository:** camera sources and their reading history
//! - **VectorIndex:** similarity index fed with each camera's history
//! - **SourceAnalyzer:** one analyze pass for one camera

use async_trait::async_trait;
use tja_common::{AnalysisOutcome, CameraSource, Reading, SourceUpdate, TrafficResult};

use crate::error::AnalyzerError;
use crate::services::image_fetcher::FetchError;
use crate::services::model_client::ModelError;

/// Downloads camera snapshots
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch raw image bytes
    ///
    /// # Errors
    /// `FetchError` on non-2xx status, transport failure or timeout
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Vision-capable language model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt, optionally with a JPEG image, and return the reply text
    ///
    /// A "no content" reply is an empty string, not an error.
    async fn complete(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError>;
}

/// Storage for camera sources and their append-only history
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// All enabled sources with their history
    async fn list_enabled(&self) -> tja_common::Result<Vec<CameraSource>>;

    /// Sources whose title matches (case-insensitive)
    async fn list_by_title(&self, title: &str) -> tja_common::Result<Vec<CameraSource>>;

    /// Patch the given fields of a source
    async fn update(&self, id: i64, fields: &SourceUpdate) -> tja_common::Result<()>;

    /// Append a reading to a source's history
    async fn append_result(&self, id: i64, reading: &Reading) -> tja_common::Result<TrafficResult>;
}

/// Similarity index over camera sources
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace a source, including its full history
    async fn upsert(&self, source: &CameraSource) -> Result<bool, AnalyzerError>;
}

/// One analysis pass for one camera identifier
#[async_trait]
pub trait SourceAnalyzer: Send + Sync {
    async fn analyze(&self, identifier: &str) -> Result<AnalysisOutcome, AnalyzerError>;
}
