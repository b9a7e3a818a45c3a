use std::path::PathBuf;

use thiserror::Error;

use crate::types::DataType;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV/JSON/Parquet (and optional Excel) loading.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The input path does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The container format could not be inferred from the path.
    #[error("unsupported file format: {message}")]
    UnsupportedFormat { message: String },

    /// Underlying I/O error (e.g. permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet ingestion error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Convenience result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Error type returned when persisting a [`crate::types::DataSet`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parquet writer error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "excel")]
    /// Excel writer error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

/// Convenience result type for plan loading.
pub type PlanResult<T> = Result<T, PlanError>;

/// Error type returned when a cleaning plan cannot be read at all.
///
/// Problems with an individual step's parameters are not plan errors; they surface as a
/// [`StepError`] when that step is executed.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan file exists but could not be read.
    #[error("failed to read plan file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plan text is not valid JSON.
    #[error("invalid plan json: {0}")]
    Json(#[from] serde_json::Error),

    /// The plan is valid JSON but not an array of step objects.
    #[error("invalid plan: {message}")]
    Shape { message: String },
}

/// A fault raised while executing a single cleaning step.
///
/// The executor records these in the report and moves on to the next step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// The step's parameters could not be decoded into the action's typed form.
    #[error("invalid parameters for '{action}': {message}")]
    InvalidParams { action: String, message: String },

    /// A column the step requires does not exist.
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A statistic was requested on a column whose type cannot support it.
    #[error("cannot compute {statistic} of column '{column}' with type {data_type}")]
    UnsupportedType {
        column: String,
        statistic: &'static str,
        data_type: DataType,
    },

    /// Any other failure inside a step.
    #[error("{0}")]
    Internal(String),
}

/// Reason a column's numeric summary was left out of a profile.
///
/// Profiling never fails as a whole; these are logged and the column keeps its basic stats.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// The numeric column has no non-null values to summarize.
    #[error("column '{column}' has no numeric values")]
    NoNumericValues { column: String },
}
