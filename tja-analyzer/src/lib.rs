//! tja-analyzer library interface
//!
//! Exposes the parser, services and scheduler for the binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod parser;
pub mod scheduler;
pub mod services;
pub mod types;

pub use crate::error::{AnalyzerError, ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::scheduler::WorkerController;
use crate::types::SourceAnalyzer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline used by the on-demand endpoint
    pub analyzer: Arc<dyn SourceAnalyzer>,
    /// Polling worker control
    pub worker: Arc<WorkerController>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Age after which the last cycle counts as stale
    pub stale_after: Duration,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn SourceAnalyzer>, worker: Arc<WorkerController>, stale_after: Duration) -> Self {
        Self {
            analyzer,
            worker,
            startup_time: Utc::now(),
            stale_after,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::worker_routes())
        .merge(api::analyze_routes())
        .with_state(state)
}
