//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`load_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - detects each column's type from the container
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! [`ingest_from_path`] does the same against a caller-provided [`crate::types::Schema`].
//! Format-specific functions are also available under [`csv`], [`json`] and [`parquet`]
//! (and `excel` with the `excel` feature).

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
mod infer;
pub mod json;
pub mod observability;
pub mod parquet;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{
    ingest_from_path, load_from_path, ExcelSheetSelection, IngestionFormat, IngestionOptions, IngestionRequest,
};
