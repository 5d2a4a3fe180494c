//! Worker control endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::scheduler::WorkerStatus;
use crate::AppState;

/// Reply to start/stop requests
#[derive(Debug, Serialize)]
pub struct WorkerActionResponse {
    /// Whether the request changed anything
    pub changed: bool,
    #[serde(flatten)]
    pub status: WorkerStatus,
}

/// GET /worker/status
pub async fn worker_status(State(state): State<AppState>) -> Json<WorkerStatus> {
    Json(state.worker.status().await)
}

/// POST /worker/start
///
/// Idempotent: a running worker is left alone.
pub async fn start_worker(State(state): State<AppState>) -> Json<WorkerActionResponse> {
    let changed = state.worker.start().await;
    Json(WorkerActionResponse {
        changed,
        status: state.worker.status().await,
    })
}

/// POST /worker/stop
///
/// Cancels the polling task and waits for it to unwind.
pub async fn stop_worker(State(state): State<AppState>) -> Json<WorkerActionResponse> {
    let changed = state.worker.stop().await;
    Json(WorkerActionResponse {
        changed,
        status: state.worker.status().await,
    })
}

pub fn worker_routes() -> Router<AppState> {
    Router::new()
        .route("/worker/status", get(worker_status))
        .route("/worker/start", post(start_worker))
        .route("/worker/stop", post(stop_worker))
}
