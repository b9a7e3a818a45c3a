//! Unified ingestion entrypoints.
//!
//! - [`load_from_path`] loads a file and detects its schema from the container.
//! - [`ingest_from_path`] loads a file against a caller-provided [`crate::types::Schema`].
//!
//! Both pick the container format from the file extension unless [`IngestionOptions::format`]
//! forces one, and both report success/failure/alerts to an optional
//! [`super::observability::IngestionObserver`].

use std::path::{Path, PathBuf};
use std::fmt;
use std::sync::Arc;
use std::error::Error as StdError;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json, parquet};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// How to choose sheet(s) when ingesting an Excel workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcelSheetSelection {
    /// Ingest the first sheet (default).
    First,
    /// Ingest a single named sheet.
    Sheet(String),
    /// Ingest all sheets and concatenate rows.
    AllSheets,
    /// Ingest only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

impl Default for ExcelSheetSelection {
    fn default() -> Self {
        Self::First
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Excel-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            excel_sheet_selection: ExcelSheetSelection::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load a file into a [`DataSet`], detecting the schema from the container.
///
/// Parquet and Excel files carry their own column types; CSV and JSON columns get the
/// narrowest type that holds all of their non-empty values.
///
/// Fails with [`IngestionError::NotFound`] when `path` does not exist and with
/// [`IngestionError::UnsupportedFormat`] when the extension is not recognized.
///
/// ```no_run
/// use rust_data_cleaning::ingestion::{load_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), rust_data_cleaning::IngestionError> {
/// let ds = load_from_path("people.csv", &IngestionOptions::default())?;
/// println!("rows={} columns={}", ds.row_count(), ds.column_count());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    run_observed(path, options, |fmt| match fmt {
        IngestionFormat::Csv => csv::load_csv_from_path(path),
        IngestionFormat::Json => json::load_json_from_path(path),
        IngestionFormat::Parquet => parquet::load_parquet_from_path(path),
        IngestionFormat::Excel => load_excel_dispatch(path, &options.excel_sheet_selection),
    })
}

/// Load a file against a caller-provided [`Schema`].
///
/// Every schema field must exist in the container and each cell is parsed into its field's
/// type. `options.excel_sheet_selection` picks the sheet(s) of a workbook.
///
/// With an observer configured, a load whose format is known reports `on_success` with the
/// row count, or `on_failure` with a severity followed by `on_alert` once that severity
/// reaches `options.alert_at_or_above`.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rust_data_cleaning::ingestion::{ingest_from_path, IngestionFormat, IngestionOptions, TracingObserver};
/// use rust_data_cleaning::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), rust_data_cleaning::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("id", DataType::Int64),
///     Field::new("name", DataType::Utf8),
/// ]);
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Csv),
///     observer: Some(Arc::new(TracingObserver)),
///     ..Default::default()
/// };
///
/// // The forced format overrides the missing extension.
/// let ds = ingest_from_path("people_export", &schema, &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    run_observed(path, options, |fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema),
        IngestionFormat::Json => json::ingest_json_from_path(path, schema),
        IngestionFormat::Parquet => parquet::ingest_parquet_from_path(path, schema),
        IngestionFormat::Excel => ingest_excel_dispatch(path, schema, &options.excel_sheet_selection),
    })
}

fn run_observed<F>(path: &Path, options: &IngestionOptions, ingest: F) -> IngestionResult<DataSet>
where
    F: FnOnce(IngestionFormat) -> IngestionResult<DataSet>,
{
    let fmt = options.format.or_else(|| IngestionFormat::from_path(path));

    let result = match fmt {
        _ if !path.exists() => Err(IngestionError::NotFound {
            path: path.to_path_buf(),
        }),
        Some(f) => ingest(f),
        None => Err(unsupported_format(path)),
    };

    if let (Some(obs), Some(format)) = (options.observer.as_ref(), fmt) {
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format,
        };
        match &result {
            Ok(ds) => obs.on_success(&ctx, IngestionStats { rows: ds.row_count() }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Unreachable or unreadable files are `Critical`; content problems are `Error`.
fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    let io_failure = match e {
        IngestionError::NotFound { .. } | IngestionError::Io(_) => true,
        IngestionError::Csv(err) => matches!(err.kind(), ::csv::ErrorKind::Io(_)),
        IngestionError::Parquet(err) => caused_by_io(err),
        #[cfg(feature = "excel")]
        IngestionError::Excel(err) => caused_by_io(err),
        IngestionError::UnsupportedFormat { .. }
        | IngestionError::SchemaMismatch { .. }
        | IngestionError::ParseError { .. } => false,
    };
    if io_failure {
        IngestionSeverity::Critical
    } else {
        IngestionSeverity::Error
    }
}

fn caused_by_io(e: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(e), |&err| err.source()).any(|err| err.is::<std::io::Error>())
}

fn unsupported_format(path: &Path) -> IngestionError {
    let message = match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("unrecognized extension '{ext}' ({})", path.display()),
        None => format!("path has no extension ({})", path.display()),
    };
    IngestionError::UnsupportedFormat { message }
}

fn ingest_excel_dispatch(
    path: &Path,
    schema: &Schema,
    sel: &ExcelSheetSelection,
) -> IngestionResult<DataSet> {
    let _ = (path, schema, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            ExcelSheetSelection::First => excel::ingest_excel_from_path(path, None, schema),
            ExcelSheetSelection::Sheet(name) => excel::ingest_excel_from_path(path, Some(name.as_str()), schema),
            ExcelSheetSelection::AllSheets => excel::ingest_excel_workbook_from_path(path, None, schema),
            ExcelSheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                excel::ingest_excel_workbook_from_path(path, Some(refs.as_slice()), schema)
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(excel_disabled())
    }
}

fn load_excel_dispatch(path: &Path, sel: &ExcelSheetSelection) -> IngestionResult<DataSet> {
    let _ = (path, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            ExcelSheetSelection::First => excel::load_excel_from_path(path, None),
            ExcelSheetSelection::Sheet(name) => excel::load_excel_from_path(path, Some(name.as_str())),
            ExcelSheetSelection::AllSheets => excel::load_excel_workbook_from_path(path, None),
            ExcelSheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                excel::load_excel_workbook_from_path(path, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(excel_disabled())
    }
}

#[cfg(not(feature = "excel"))]
fn excel_disabled() -> IngestionError {
    IngestionError::UnsupportedFormat {
        message: "excel support not enabled (enable cargo feature 'excel')".to_string(),
    }
}

/// An owned load request, e.g. for handing work to another thread.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Schema to parse values into; `None` detects it from the container.
    pub schema: Option<Schema>,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("schema_fields", &self.schema.as_ref().map(Schema::len))
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// A request that detects the schema and uses default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: None,
            options: IngestionOptions::default(),
        }
    }

    /// Execute the request with [`ingest_from_path`] or [`load_from_path`].
    pub fn run(&self) -> IngestionResult<DataSet> {
        match &self.schema {
            Some(schema) => ingest_from_path(&self.path, schema, &self.options),
            None => load_from_path(&self.path, &self.options),
        }
    }
}
