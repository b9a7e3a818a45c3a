use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::StepError;

/// Events emitted by [`super::CleaningExecutor`] while running a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// Execution began on a dataset of `rows` rows.
    RunStarted { steps: usize, rows: usize },
    /// A step with an unknown or missing action tag was passed over.
    StepIgnored { step: usize, action: Option<String> },
    StepStarted { step: usize, action: String },
    /// The step produced a new dataset.
    StepApplied {
        step: usize,
        rows_before: usize,
        rows_after: usize,
    },
    /// The step ran but found nothing to do; it leaves no report entry.
    StepSkipped { step: usize, reason: String },
    /// The step raised a fault; the dataset is unchanged.
    StepFailed { step: usize, error: StepError },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Observer that keeps every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events received so far.
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ExecutionObserver for EventLog {
    fn on_event(&self, event: &ExecutionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Real-time metrics for a cleaning run.
///
/// The executor updates these counters step by step; callers can snapshot them at any time.
/// Counters reset at the start of every run.
#[derive(Debug)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    steps_total: AtomicU64,
    steps_applied: AtomicU64,
    steps_skipped: AtomicU64,
    steps_failed: AtomicU64,
    steps_ignored: AtomicU64,
    rows_removed: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            steps_total: AtomicU64::new(0),
            steps_applied: AtomicU64::new(0),
            steps_skipped: AtomicU64::new(0),
            steps_failed: AtomicU64::new(0),
            steps_ignored: AtomicU64::new(0),
            rows_removed: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self, steps: usize) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.steps_total.store(steps as u64, Ordering::SeqCst);
        self.steps_applied.store(0, Ordering::SeqCst);
        self.steps_skipped.store(0, Ordering::SeqCst);
        self.steps_failed.store(0, Ordering::SeqCst);
        self.steps_ignored.store(0, Ordering::SeqCst);
        self.rows_removed.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_step_applied(&self, rows_before: usize, rows_after: usize) {
        let _ = self.steps_applied.fetch_add(1, Ordering::SeqCst);
        let removed = rows_before.saturating_sub(rows_after) as u64;
        let _ = self.rows_removed.fetch_add(removed, Ordering::SeqCst);
    }

    pub fn on_step_skipped(&self) {
        let _ = self.steps_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_step_failed(&self) {
        let _ = self.steps_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_step_ignored(&self) {
        let _ = self.steps_ignored.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            steps_total: self.steps_total.load(Ordering::SeqCst),
            steps_applied: self.steps_applied.load(Ordering::SeqCst),
            steps_skipped: self.steps_skipped.load(Ordering::SeqCst),
            steps_failed: self.steps_failed.load(Ordering::SeqCst),
            steps_ignored: self.steps_ignored.load(Ordering::SeqCst),
            rows_removed: self.rows_removed.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub steps_total: u64,
    pub steps_applied: u64,
    pub steps_skipped: u64,
    pub steps_failed: u64,
    pub steps_ignored: u64,
    pub rows_removed: u64,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, steps={} (applied={}, skipped={}, failed={}, ignored={}), rows_removed={}, elapsed={:?}",
            self.run_id,
            self.steps_total,
            self.steps_applied,
            self.steps_skipped,
            self.steps_failed,
            self.steps_ignored,
            self.rows_removed,
            self.elapsed
        )
    }
}
