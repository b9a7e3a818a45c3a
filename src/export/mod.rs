//! Persisting a [`DataSet`] to disk.
//!
//! [`save_to_path`] picks the container from the file extension: `csv`, `json`/`ndjson`,
//! `parquet`/`pq`, and `xlsx` with the `excel` feature. Any other extension is written as
//! CSV to `<path>.csv`.
//!
//! ```no_run
//! use rust_data_cleaning::export::save_to_path;
//! use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), rust_data_cleaning::ExportError> {
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("id", DataType::Int64)]),
//!     vec![vec![Value::Int64(1)]],
//! );
//! let written = save_to_path(&ds, "out.dat")?;
//! assert_eq!(written.to_str(), Some("out.dat.csv"));
//! # Ok(())
//! # }
//! ```

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod parquet;

use std::path::{Path, PathBuf};

use crate::error::ExportResult;
use crate::types::DataSet;

/// Containers a dataset can be saved as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of row objects.
    Json,
    /// Apache Parquet, one row group.
    Parquet,
    /// Excel workbook (feature-gated behind `excel`).
    #[cfg(feature = "excel")]
    Xlsx,
}

impl ExportFormat {
    /// Parse an export format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            #[cfg(feature = "excel")]
            "xlsx" => Some(Self::Xlsx),
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

/// Where and how [`save_to_path`] writes a dataset for `path`.
///
/// Unrecognized (or absent) extensions resolve to CSV at `path` with `.csv` appended.
pub fn resolve_target(path: &Path) -> (ExportFormat, PathBuf) {
    match ExportFormat::from_path(path) {
        Some(format) => (format, path.to_path_buf()),
        None => {
            let mut target = path.as_os_str().to_owned();
            target.push(".csv");
            (ExportFormat::Csv, PathBuf::from(target))
        }
    }
}

/// Save `ds` to `path`, returning the path actually written.
pub fn save_to_path(ds: &DataSet, path: impl AsRef<Path>) -> ExportResult<PathBuf> {
    let (format, target) = resolve_target(path.as_ref());
    if target != path.as_ref() {
        tracing::debug!(
            requested = %path.as_ref().display(),
            written = %target.display(),
            "unrecognized output extension, writing csv"
        );
    }

    match format {
        ExportFormat::Csv => csv::write_csv_to_path(ds, &target)?,
        ExportFormat::Json => json::write_json_to_path(ds, &target)?,
        ExportFormat::Parquet => parquet::write_parquet_to_path(ds, &target)?,
        #[cfg(feature = "excel")]
        ExportFormat::Xlsx => excel::write_xlsx_to_path(ds, &target)?,
    }

    tracing::debug!(
        format = ?format,
        path = %target.display(),
        rows = ds.row_count(),
        columns = ds.column_count(),
        "dataset saved"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_keep_the_path() {
        assert_eq!(
            resolve_target(Path::new("out/a.JSON")),
            (ExportFormat::Json, PathBuf::from("out/a.JSON"))
        );
        assert_eq!(
            resolve_target(Path::new("a.pq")),
            (ExportFormat::Parquet, PathBuf::from("a.pq"))
        );
    }

    #[test]
    fn unknown_extensions_fall_back_to_csv() {
        assert_eq!(
            resolve_target(Path::new("a.txt")),
            (ExportFormat::Csv, PathBuf::from("a.txt.csv"))
        );
        assert_eq!(
            resolve_target(Path::new("noext")),
            (ExportFormat::Csv, PathBuf::from("noext.csv"))
        );
    }
}
