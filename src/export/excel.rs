#![cfg(feature = "excel")]

//! XLSX export through `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::ExportResult;
use crate::types::{DataSet, Value};

/// Write `ds` to `path` as a one-sheet workbook named `Sheet1`.
///
/// Row 0 holds the headers. Numbers and booleans are native cells, timestamps are ISO-8601
/// text. Nulls and non-finite floats are left blank.
pub fn write_xlsx_to_path(ds: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1")?;

    for (c, name) in ds.schema.field_names().enumerate() {
        ws.write_string(0, column_index(c)?, name)?;
    }

    for (r, row) in ds.rows.iter().enumerate() {
        let r = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (c, v) in row.iter().enumerate() {
            let c = column_index(c)?;
            match v {
                Value::Null => {}
                Value::Float64(f) if !f.is_finite() => {}
                Value::Int64(i) => {
                    ws.write_number(r, c, *i as f64)?;
                }
                Value::Float64(f) => {
                    ws.write_number(r, c, *f)?;
                }
                Value::Bool(b) => {
                    ws.write_boolean(r, c, *b)?;
                }
                Value::Utf8(s) => {
                    ws.write_string(r, c, s)?;
                }
                Value::Timestamp(_) => {
                    ws.write_string(r, c, v.to_json().as_str().unwrap_or_default())?;
                }
            }
        }
    }

    wb.save(path)?;
    Ok(())
}

fn column_index(c: usize) -> Result<u16, XlsxError> {
    u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)
}
