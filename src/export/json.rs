//! JSON export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ExportResult;
use crate::types::DataSet;

/// Write `ds` to `path` as a pretty-printed JSON array of row objects.
pub fn write_json_to_path(ds: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &records(ds))?;
    out.flush()?;
    Ok(())
}

/// Rows of `ds` as JSON objects keyed by column name, columns in schema order.
///
/// Cells go through [`crate::types::Value::to_json`].
pub fn records(ds: &DataSet) -> Vec<serde_json::Map<String, serde_json::Value>> {
    ds.rows
        .iter()
        .map(|row| {
            ds.schema
                .fields
                .iter()
                .zip(row)
                .map(|(field, v)| (field.name.clone(), v.to_json()))
                .collect()
        })
        .collect()
}
