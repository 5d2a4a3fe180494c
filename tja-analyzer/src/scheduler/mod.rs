//! Polling scheduler
//!
//! One long-lived task, strictly sequential:
//! 1. warm-up delay
//! 2. bootstrap: name every placeholder-titled camera (first error ends the phase)
//! 3. steady state forever: analyze each enabled camera, append the reading,
//!    push the camera to the vector index (errors are per camera)
//!
//! Every delay and every per-camera operation races the cancellation token,
//! so [`SchedulerHandle::stop`] returns promptly.

mod controller;
pub mod state;

pub use controller::{WorkerController, WorkerStatus};
pub use state::{SchedulerPhase, SchedulerState, SchedulerStatus};

use std::sync::Arc;
use std::time::Duration;
use tja_common::config::SchedulerConfig;
use tja_common::{CameraSource, SourceUpdate};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::AnalyzerError;
use crate::types::{SourceAnalyzer, SourceRepository, VectorIndex};

/// Fixed delays and the placeholder title
#[derive(Debug, Clone)]
pub struct SchedulerTimings {
    pub warmup: Duration,
    pub bootstrap_pacing: Duration,
    pub cycle_pacing: Duration,
    pub cycle_interval: Duration,
    pub placeholder_title: String,
}

impl SchedulerTimings {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            warmup: Duration::from_secs(config.warmup_secs),
            bootstrap_pacing: Duration::from_secs(config.bootstrap_pacing_secs),
            cycle_pacing: Duration::from_secs(config.cycle_pacing_secs),
            cycle_interval: Duration::from_secs(config.cycle_interval_secs),
            placeholder_title: config.placeholder_title.clone(),
        }
    }
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

/// Counts for one steady-state cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Cameras whose reading was stored
    pub recorded: u64,
    /// Cameras analyzed without a usable reading
    pub skipped: u64,
    /// Cameras whose processing raised an error
    pub failed: u64,
}

pub struct PollingScheduler {
    analyzer: Arc<dyn SourceAnalyzer>,
    repository: Arc<dyn SourceRepository>,
    index: Arc<dyn VectorIndex>,
    timings: SchedulerTimings,
    state: Arc<SchedulerState>,
}

/// Running scheduler task
pub struct SchedulerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal cancellation and wait for the task to unwind
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

impl PollingScheduler {
    pub fn new(
        analyzer: Arc<dyn SourceAnalyzer>,
        repository: Arc<dyn SourceRepository>,
        index: Arc<dyn VectorIndex>,
        timings: SchedulerTimings,
    ) -> Self {
        Self {
            analyzer,
            repository,
            index,
            timings,
            state: Arc::new(SchedulerState::new()),
        }
    }

    /// Shared read-only view for health checks
    pub fn state(&self) -> Arc<SchedulerState> {
        Arc::clone(&self.state)
    }

    /// Run the scheduler on a background task
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(token).await });
        SchedulerHandle { cancel, task }
    }

    /// Warm-up, bootstrap, then steady-state cycles until cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        info!(warmup_secs = self.timings.warmup.as_secs(), "Traffic worker starting");
        self.state.set_phase(SchedulerPhase::WarmingUp);

        if !pause(self.timings.warmup, &cancel).await {
            return self.finish();
        }

        self.state.set_phase(SchedulerPhase::Bootstrapping);
        match self.run_bootstrap(&cancel).await {
            Ok(named) => info!(named, "Bootstrap phase complete"),
            Err(AnalyzerError::Cancelled) => return self.finish(),
            Err(e) => error!(error = %e, "Bootstrap phase aborted, remaining unnamed sources skipped"),
        }

        if cancel.is_cancelled() {
            return self.finish();
        }

        self.state.set_phase(SchedulerPhase::Running);
        loop {
            if self.run_cycle(&cancel).await.is_err() {
                break;
            }
            if !pause(self.timings.cycle_interval, &cancel).await {
                break;
            }
        }

        self.finish();
    }

    fn finish(&self) {
        self.state.set_phase(SchedulerPhase::Stopped);
        info!("Traffic worker stopped");
    }

    /// Name every camera that still carries the placeholder title
    ///
    /// The first failure ends the whole phase. Returns how many cameras got
    /// a name.
    pub async fn run_bootstrap(&self, cancel: &CancellationToken) -> Result<usize, AnalyzerError> {
        let sources = tokio::select! {
            _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
            sources = self.repository.list_by_title(&self.timings.placeholder_title) => sources?,
        };
        info!(count = sources.len(), "Bootstrapping unnamed sources");

        let mut named = 0;
        for source in sources {
            let identifier = source.identifier();

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
                outcome = self.analyzer.analyze(&identifier) => outcome?,
            };

            match outcome.reading {
                Some(reading) => {
                    let update = SourceUpdate::from_reading(&reading);
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
                        updated = self.repository.update(source.id, &update) => updated?,
                    }
                    named += 1;
                    info!(source_id = source.id, title = %reading.title, "Source named");
                }
                None => warn!(source_id = source.id, identifier = %identifier, "No reading for unnamed source"),
            }

            if !pause(self.timings.bootstrap_pacing, cancel).await {
                return Err(AnalyzerError::Cancelled);
            }
        }

        Ok(named)
    }

    /// One pass over every enabled camera
    ///
    /// A failing camera is logged and the pass moves on. `last_run` is
    /// recorded at the end even when listing the cameras failed. Only
    /// cancellation returns an error.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleReport, AnalyzerError> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", cycle_id = %cycle_id);

        async move {
            let mut report = CycleReport::default();

            let listed = tokio::select! {
                _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
                listed = self.repository.list_enabled() => listed,
            };

            match listed {
                Ok(sources) => {
                    debug!(count = sources.len(), "Cycle started");

                    for source in sources {
                        let source_id = source.id;
                        let result = tokio::select! {
                            _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
                            result = self.process_source(source) => result,
                        };

                        match result {
                            Ok(true) => report.recorded += 1,
                            Ok(false) => report.skipped += 1,
                            Err(e) => {
                                report.failed += 1;
                                error!(source_id, error = %e, "Error processing traffic source");
                            }
                        }

                        if !pause(self.timings.cycle_pacing, cancel).await {
                            return Err(AnalyzerError::Cancelled);
                        }
                    }
                }
                Err(e) => error!(error = %e, "Failed to list enabled sources"),
            }

            // A cancelled cycle never counts as completed
            if cancel.is_cancelled() {
                return Err(AnalyzerError::Cancelled);
            }

            self.state.record_cycle(report.recorded, report.failed);
            info!(
                recorded = report.recorded,
                skipped = report.skipped,
                failed = report.failed,
                "Cycle complete"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Analyze one camera and persist the reading
    ///
    /// Returns whether a reading was stored.
    async fn process_source(&self, mut source: CameraSource) -> Result<bool, AnalyzerError> {
        let identifier = source.identifier();
        let outcome = self.analyzer.analyze(&identifier).await?;

        let Some(reading) = outcome.reading else {
            warn!(source_id = source.id, identifier = %identifier, "No reading produced");
            return Ok(false);
        };

        let stored = self.repository.append_result(source.id, &reading).await?;
        source.record_result(stored);

        if !self.index.upsert(&source).await? {
            warn!(source_id = source.id, "Vector index did not acknowledge update");
        }

        info!(
            source_id = source.id,
            traffic = reading.traffic,
            history = source.results.len(),
            "Traffic reading recorded"
        );
        Ok(true)
    }
}

/// Sleep unless cancelled first; `false` means stop
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return !cancel.is_cancelled();
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timings_from_default_config() {
        let timings = SchedulerTimings::default();
        assert_eq!(timings.warmup, Duration::from_secs(30));
        assert_eq!(timings.bootstrap_pacing, Duration::from_secs(35));
        assert_eq!(timings.cycle_pacing, Duration::from_secs(5));
        assert_eq!(timings.cycle_interval, Duration::from_secs(60));
        assert_eq!(timings.placeholder_title, "entry");
    }

    #[tokio::test]
    async fn pause_returns_false_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!pause(Duration::from_secs(3600), &cancel).await);
        assert!(!pause(Duration::ZERO, &cancel).await);
    }

    #[tokio::test]
    async fn zero_pause_completes() {
        let cancel = CancellationToken::new();
        assert!(pause(Duration::ZERO, &cancel).await);
    }
}
