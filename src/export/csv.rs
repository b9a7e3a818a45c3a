//! CSV export.

use std::io::Write;
use std::path::Path;

use crate::error::ExportResult;
use crate::types::{DataSet, Value};

/// Write `ds` as CSV to `path`.
pub fn write_csv_to_path(ds: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    write_csv(ds, &mut wtr)
}

/// Write `ds` as CSV through an existing writer.
///
/// The first record is the header. Nulls are empty cells; floats always carry a decimal
/// point or exponent so a reload detects them as floats again.
pub fn write_csv<W: Write>(ds: &DataSet, wtr: &mut csv::Writer<W>) -> ExportResult<()> {
    wtr.write_record(ds.schema.field_names())?;
    for row in &ds.rows {
        wtr.write_record(row.iter().map(cell_text))?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Float64(f) => format!("{f:?}"),
        other => other.to_string(),
    }
}
