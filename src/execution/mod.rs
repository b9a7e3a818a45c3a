//! Execution engine for cleaning plans.
//!
//! [`CleaningExecutor`] runs the steps of a [`Plan`] strictly in order on a working copy of
//! the input. Each step either commits a new dataset, is skipped, or fails; a failure is
//! recorded in the [`Report`] and the run moves on. The engine also provides:
//!
//! - real-time [`ExecutionMetrics`] that callers can snapshot
//! - observer hooks ([`ExecutionObserver`]) for monitoring
//! - `tracing` logs for every step

mod observer;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::cleaning::{Plan, PlanStep, Report, ReportEntry, StepEffect, StepKind, StepOutcome};
use crate::cleaning::{StepResult, Transform};
use crate::error::StepError;
use crate::types::DataSet;

pub use observer::{
    EventLog, ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
};

/// Configuration for the [`CleaningExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Turn a panic inside a step into a [`StepError::Internal`] failure instead of
    /// unwinding through the caller.
    pub catch_panics: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { catch_panics: true }
    }
}

/// Result of running a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    /// The dataset after every committed step.
    pub dataset: DataSet,
    /// One entry per applied or failed step.
    pub report: Report,
}

/// Sequential executor for cleaning plans.
pub struct CleaningExecutor {
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl CleaningExecutor {
    /// Create an executor with default options.
    pub fn new() -> Self {
        Self::with_options(ExecutionOptions::default())
    }

    pub fn with_options(opts: ExecutionOptions) -> Self {
        Self {
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `plan` over a copy of `dataset`.
    ///
    /// Never fails as a whole: step faults are recorded in the report and the input is left
    /// untouched.
    pub fn apply(&self, dataset: &DataSet, plan: &Plan) -> CleaningOutcome {
        let start = Instant::now();
        self.metrics.begin_run(plan.len());
        self.emit(ExecutionEvent::RunStarted {
            steps: plan.len(),
            rows: dataset.row_count(),
        });

        let mut current = dataset.clone();
        let mut report = Report::new();

        for step in plan.steps() {
            let transform = match &step.kind {
                StepKind::Ready(t) => t.as_ref(),
                StepKind::Invalid(error) => {
                    self.record_failure(step, error.clone(), &mut report);
                    continue;
                }
                StepKind::Unrecognized => {
                    tracing::debug!(
                        step = step.index,
                        action = ?step.action,
                        "ignoring step with unrecognized action"
                    );
                    self.metrics.on_step_ignored();
                    self.emit(ExecutionEvent::StepIgnored {
                        step: step.index,
                        action: step.action.clone(),
                    });
                    continue;
                }
            };

            let action = step.action.clone().unwrap_or_default();
            self.emit(ExecutionEvent::StepStarted {
                step: step.index,
                action: action.clone(),
            });

            match self.run_step(transform, &current) {
                Ok(StepEffect::Applied {
                    dataset: next,
                    message,
                }) => {
                    let (rows_before, rows_after) = (current.row_count(), next.row_count());
                    tracing::debug!(step = step.index, %action, rows_before, rows_after, "{message}");
                    self.metrics.on_step_applied(rows_before, rows_after);
                    self.emit(ExecutionEvent::StepApplied {
                        step: step.index,
                        rows_before,
                        rows_after,
                    });
                    report.push(ReportEntry {
                        step: step.index,
                        raw: step.raw_json(),
                        action: step.action.clone(),
                        outcome: StepOutcome::Applied { message },
                    });
                    current = next;
                }
                Ok(StepEffect::Skipped { reason }) => {
                    tracing::debug!(step = step.index, %action, %reason, "step skipped");
                    self.metrics.on_step_skipped();
                    self.emit(ExecutionEvent::StepSkipped {
                        step: step.index,
                        reason,
                    });
                }
                Err(error) => self.record_failure(step, error, &mut report),
            }
        }

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        let metrics = self.metrics.snapshot();
        tracing::info!(
            steps = plan.len(),
            applied = metrics.steps_applied,
            failed = metrics.steps_failed,
            rows_in = dataset.row_count(),
            rows_out = current.row_count(),
            "cleaning run finished in {elapsed:?}"
        );
        self.emit(ExecutionEvent::RunFinished { elapsed, metrics });

        CleaningOutcome {
            dataset: current,
            report,
        }
    }

    fn run_step(&self, transform: &dyn Transform, dataset: &DataSet) -> StepResult {
        if !self.opts.catch_panics {
            return transform.apply(dataset);
        }
        panic::catch_unwind(AssertUnwindSafe(|| transform.apply(dataset))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "step panicked".to_string());
                Err(StepError::Internal(message))
            },
        )
    }

    fn record_failure(&self, step: &PlanStep, error: StepError, report: &mut Report) {
        tracing::warn!(step = step.index, action = ?step.action, %error, "step failed");
        self.metrics.on_step_failed();
        self.emit(ExecutionEvent::StepFailed {
            step: step.index,
            error: error.clone(),
        });
        report.push(ReportEntry {
            step: step.index,
            raw: step.raw_json(),
            action: step.action.clone(),
            outcome: StepOutcome::Failed { error },
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

impl Default for CleaningExecutor {
    fn default() -> Self {
        Self::new()
    }
}
