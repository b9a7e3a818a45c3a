//! Ingestion outcome reporting: severities, observer trait and the bundled observers.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::IngestionError;

use super::unified::IngestionFormat;

/// How bad a failed load is. Ordered, so it can be compared against an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    Warning,
    /// The file was reachable but its content could not be loaded.
    Error,
    /// The file itself could not be reached (missing, unreadable).
    Critical,
}

/// Which file was loaded, and as what.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    pub path: PathBuf,
    pub format: IngestionFormat,
}

/// Summary of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
}

/// Receives the outcome of every load whose format could be determined.
///
/// All callbacks default to no-ops, except `on_alert`, which forwards to `on_failure`.
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called after `on_failure` when `severity` reaches [`crate::ingestion::IngestionOptions::alert_at_or_above`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    fn each(&self, f: impl Fn(&dyn IngestionObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Forwards ingestion events to `tracing` under the `ingestion` target.
///
/// Successes log at `info`, failures at `warn` (or `error` for critical ones), alerts at `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            target: "ingestion",
            format = ?ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            "ingestion succeeded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        if severity >= IngestionSeverity::Critical {
            tracing::error!(target: "ingestion", ?severity, format = ?ctx.format, path = %ctx.path.display(), %error, "ingestion failed");
        } else {
            tracing::warn!(target: "ingestion", ?severity, format = ?ctx.format, path = %ctx.path.display(), %error, "ingestion failed");
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            target: "ingestion",
            alert = true,
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "ingestion alert"
        );
    }
}

/// Appends one line per ingestion event to a log file.
///
/// Lines look like `2024-05-01T10:00:00.000Z ok format=Csv path=in.csv rows=10`. Failures to
/// open or write the file are swallowed.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn record(&self, event: &str, ctx: &IngestionContext, detail: fmt::Arguments<'_>) {
        let stamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let _guard = self.lock.lock().ok();
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) else {
            return;
        };
        let _ = writeln!(
            file,
            "{stamp} {event} format={:?} path={} {detail}",
            ctx.format,
            ctx.path.display()
        );
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.record("ok", ctx, format_args!("rows={}", stats.rows));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(&format!("fail severity={severity:?}"), ctx, format_args!("err={error}"));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(&format!("ALERT severity={severity:?}"), ctx, format_args!("err={error}"));
    }
}
