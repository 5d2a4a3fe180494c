//! Health check endpoint
//!
//! Reports build info and scheduler liveness. `status` turns "degraded" when
//! the worker runs but its last completed cycle is too old.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scheduler::SchedulerPhase;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    /// Module name ("tja-analyzer")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Short git hash captured at build time
    pub git_hash: String,
    /// Build time (RFC 3339) captured by the build script
    pub build_timestamp: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub worker_running: bool,
    pub phase: SchedulerPhase,
    /// Completion time of the last steady-state cycle
    pub last_run: DateTime<Utc>,
    pub cycles_completed: u64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    let uptime_seconds = now.signed_duration_since(state.startup_time).num_seconds().max(0) as u64;

    let worker_running = state.worker.is_running().await;
    let scheduler = state.worker.state().snapshot();

    let status = if worker_running && scheduler.is_stale(now, state.stale_after) {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        module: "tja-analyzer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        uptime_seconds,
        worker_running,
        phase: scheduler.phase,
        last_run: scheduler.last_run,
        cycles_completed: scheduler.cycles_completed,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
