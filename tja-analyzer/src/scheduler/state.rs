//! Scheduler liveness state
//!
//! Written only by the polling task, read by health checks. Plain atomics:
//! there is a single writer, readers only need visibility.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;
use tja_common::time;

/// Where the polling task currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SchedulerPhase {
    Idle = 0,
    WarmingUp = 1,
    Bootstrapping = 2,
    Running = 3,
    Stopped = 4,
}

impl SchedulerPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SchedulerPhase::WarmingUp,
            2 => SchedulerPhase::Bootstrapping,
            3 => SchedulerPhase::Running,
            4 => SchedulerPhase::Stopped,
            _ => SchedulerPhase::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerPhase::Idle => "idle",
            SchedulerPhase::WarmingUp => "warming_up",
            SchedulerPhase::Bootstrapping => "bootstrapping",
            SchedulerPhase::Running => "running",
            SchedulerPhase::Stopped => "stopped",
        }
    }
}

#[derive(Debug)]
pub struct SchedulerState {
    phase: AtomicU8,
    last_run_millis: AtomicI64,
    cycles_completed: AtomicU64,
    last_cycle_recorded: AtomicU64,
    last_cycle_failed: AtomicU64,
}

/// Point-in-time copy of [`SchedulerState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub phase: SchedulerPhase,
    pub last_run: DateTime<Utc>,
    pub cycles_completed: u64,
    pub last_cycle_recorded: u64,
    pub last_cycle_failed: u64,
}

impl SchedulerStatus {
    /// Whether the last completed cycle is older than `stale_after`
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        let age = now.signed_duration_since(self.last_run);
        age.to_std().map(|age| age > stale_after).unwrap_or(false)
    }
}

impl SchedulerState {
    /// Fresh state; `last_run` starts at construction time
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(SchedulerPhase::Idle as u8),
            last_run_millis: AtomicI64::new(time::to_unix_millis(&time::now())),
            cycles_completed: AtomicU64::new(0),
            last_cycle_recorded: AtomicU64::new(0),
            last_cycle_failed: AtomicU64::new(0),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        SchedulerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: SchedulerPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub fn last_run(&self) -> DateTime<Utc> {
        let millis = self.last_run_millis.load(Ordering::Acquire);
        time::from_unix_millis(millis).unwrap_or_else(time::now)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Acquire)
    }

    /// Mark a steady-state cycle as finished now
    pub(crate) fn record_cycle(&self, recorded: u64, failed: u64) {
        self.last_cycle_recorded.store(recorded, Ordering::Release);
        self.last_cycle_failed.store(failed, Ordering::Release);
        self.last_run_millis
            .store(time::to_unix_millis(&time::now()), Ordering::Release);
        self.cycles_completed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self) -> SchedulerStatus {
        SchedulerStatus {
            phase: self.phase(),
            last_run: self.last_run(),
            cycles_completed: self.cycles_completed(),
            last_cycle_recorded: self.last_cycle_recorded.load(Ordering::Acquire),
            last_cycle_failed: self.last_cycle_failed.load(Ordering::Acquire),
        }
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}
