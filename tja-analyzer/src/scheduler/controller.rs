//! Start/stop control for the polling task

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::{PollingScheduler, SchedulerHandle, SchedulerState, SchedulerStatus};

/// Worker state reported by the control endpoints
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    #[serde(flatten)]
    pub scheduler: SchedulerStatus,
}

/// Owns at most one running scheduler task
pub struct WorkerController {
    scheduler: Arc<PollingScheduler>,
    handle: Mutex<Option<SchedulerHandle>>,
}

impl WorkerController {
    pub fn new(scheduler: Arc<PollingScheduler>) -> Self {
        Self {
            scheduler,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the scheduler unless it is already running
    ///
    /// Returns `true` when a new task was started.
    pub async fn start(&self) -> bool {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        *handle = Some(Arc::clone(&self.scheduler).spawn());
        info!("Traffic worker started");
        true
    }

    /// Cancel the running task and wait for it
    ///
    /// The lock is held until the task has been joined, so a concurrent
    /// `start` never overlaps the unwinding task. Returns `false` when
    /// nothing was running.
    pub async fn stop(&self) -> bool {
        let mut handle = self.handle.lock().await;
        match handle.take() {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub async fn status(&self) -> WorkerStatus {
        WorkerStatus {
            running: self.is_running().await,
            scheduler: self.scheduler.state().snapshot(),
        }
    }

    pub fn state(&self) -> Arc<SchedulerState> {
        self.scheduler.state()
    }
}
