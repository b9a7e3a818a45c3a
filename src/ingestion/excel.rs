#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType as _, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{parse_timestamp, DataSet, DataType, Field, Schema, Value};

use super::infer::value_from_text;

/// Ingest an Excel document (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Validates that all schema fields exist as headers
/// - Reads remaining rows and converts cells into typed `Value`s
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = resolve_sheet(&workbook, sheet_name)?;
    let range = workbook.worksheet_range(&sheet)?;
    let rows = ingest_sheet_range(&sheet, &range, schema)?;
    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest multiple sheets from an Excel workbook and concatenate all rows into one `DataSet`.
///
/// - If `sheet_names` is `None`, ingests **all sheets** in workbook order.
/// - If `sheet_names` is `Some(&[...])`, ingests only those sheets (in the provided order).
///
/// All selected sheets must share the schema's headers.
pub fn ingest_excel_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheets = select_sheets(&workbook, sheet_names)?;

    let mut all_rows: Vec<Vec<Value>> = Vec::new();
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let mut sheet_rows = ingest_sheet_range(&sheet, &range, schema)?;
        all_rows.append(&mut sheet_rows);
    }

    Ok(DataSet::new(schema.clone(), all_rows))
}

/// Ingest one sheet (the first one when `sheet_name` is `None`), detecting its schema.
///
/// Every header becomes a column. Whole-number columns are `Int64`, other numeric columns
/// `Float64`, date cells (or text that parses as a date) `Timestamp`, boolean cells `Bool`,
/// and anything else `Utf8`.
pub fn load_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = resolve_sheet(&workbook, sheet_name)?;
    let range = workbook.worksheet_range(&sheet)?;
    let schema = infer_sheet_schema(&range).map_err(|e| wrap_schema_err_with_sheet(&sheet, e))?;
    let rows = ingest_sheet_range(&sheet, &range, &schema)?;
    Ok(DataSet::new(schema, rows))
}

/// Ingest several sheets, detecting the schema from the first selected one.
///
/// Later sheets must carry the first sheet's headers.
pub fn load_excel_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheets = select_sheets(&workbook, sheet_names)?;

    let first = workbook.worksheet_range(&sheets[0])?;
    let schema = infer_sheet_schema(&first).map_err(|e| wrap_schema_err_with_sheet(&sheets[0], e))?;

    let mut all_rows = ingest_sheet_range(&sheets[0], &first, &schema)?;
    for sheet in &sheets[1..] {
        let range = workbook.worksheet_range(sheet)?;
        all_rows.append(&mut ingest_sheet_range(sheet, &range, &schema)?);
    }

    Ok(DataSet::new(schema, all_rows))
}

fn resolve_sheet<RS: std::io::Read + std::io::Seek>(
    workbook: &calamine::Sheets<RS>,
    sheet_name: Option<&str>,
) -> IngestionResult<String> {
    match sheet_name {
        Some(name) => Ok(name.to_string()),
        None => workbook
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| IngestionError::SchemaMismatch {
                message: "workbook has no sheets".to_string(),
            }),
    }
}

fn select_sheets<RS: std::io::Read + std::io::Seek>(
    workbook: &calamine::Sheets<RS>,
    sheet_names: Option<&[&str]>,
) -> IngestionResult<Vec<String>> {
    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names(),
    };
    if sheets.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }
    Ok(sheets)
}

fn ingest_sheet_range(
    sheet: &str,
    range: &calamine::Range<Data>,
    schema: &Schema,
) -> IngestionResult<Vec<Vec<Value>>> {
    let (header_row_idx, header_cells) =
        find_header_row(range).map_err(|e| wrap_schema_err_with_sheet(sheet, e))?;
    let col_idxs =
        project_headers(&header_cells, schema).map_err(|e| wrap_schema_err_with_sheet(sheet, e))?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row) in range.rows().enumerate().skip(header_row_idx + 1) {
        // Report 1-based row number (Excel-like).
        let user_row = idx0 + 1;

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &col_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            out_row.push(convert_cell(user_row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    Ok(rows)
}

fn infer_sheet_schema(range: &calamine::Range<Data>) -> IngestionResult<Schema> {
    let (header_row_idx, header_cells) = find_header_row(range)?;
    let body: Vec<&[Data]> = range.rows().skip(header_row_idx + 1).collect();

    let fields = header_cells
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .filter_map(|row| row.get(idx))
                .filter(|c| !c.is_empty())
                .collect();
            Field::new(name.trim(), infer_cell_type(&cells))
        })
        .collect();
    Ok(Schema::new(fields))
}

fn infer_cell_type(cells: &[&Data]) -> DataType {
    if cells.is_empty() {
        return DataType::Float64;
    }
    let whole = |c: &Data| match c {
        Data::Int(_) => true,
        Data::Float(f) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    };
    if cells.iter().all(|c| whole(c)) {
        DataType::Int64
    } else if cells.iter().all(|c| c.is_int() || c.is_float()) {
        DataType::Float64
    } else if cells.iter().all(|c| c.is_bool()) {
        DataType::Bool
    } else if cells.iter().all(|c| cell_to_timestamp(c).is_some()) {
        DataType::Timestamp
    } else {
        DataType::Utf8
    }
}

fn wrap_schema_err_with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::SchemaMismatch { message } => IngestionError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn find_header_row(range: &calamine::Range<Data>) -> IngestionResult<(usize, Vec<String>)> {
    range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| (idx0, row.iter().map(cell_to_header_string).collect()))
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })
}

fn project_headers(header_cells: &[String], schema: &Schema) -> IngestionResult<Vec<usize>> {
    schema
        .fields
        .iter()
        .map(|f| {
            header_cells
                .iter()
                .position(|h| h.trim() == f.name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        f.name, header_cells
                    ),
                })
        })
        .collect()
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => cell_to_string(other),
    }
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if matches!(c, Data::Empty) {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Bool => parse_bool_cell(row, column, c).map(Value::Bool),
        DataType::Int64 => parse_i64_cell(row, column, c).map(Value::Int64),
        DataType::Float64 => parse_f64_cell(row, column, c).map(Value::Float64),
        DataType::Timestamp => cell_to_timestamp(c)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_error(row, column, c, "expected date or date-time")),
        DataType::Mixed => Ok(match c {
            Data::Int(i) => Value::Int64(*i),
            Data::Float(f) => Value::Float64(*f),
            Data::Bool(b) => Value::Bool(*b),
            Data::DateTime(_) | Data::DateTimeIso(_) => {
                cell_to_timestamp(c).map_or_else(|| Value::Utf8(cell_to_string(c)), Value::Timestamp)
            }
            Data::String(s) => value_from_text(s),
            other => Value::Utf8(cell_to_string(other)),
        }),
    }
}

fn parse_error(row: usize, column: &str, c: &Data, message: &str) -> IngestionError {
    IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: c.to_string(),
        message: message.to_string(),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        _ => c.to_string(),
    }
}

fn cell_to_timestamp(c: &Data) -> Option<chrono::NaiveDateTime> {
    match c {
        Data::DateTime(_) => c.as_datetime(),
        Data::DateTimeIso(s) | Data::String(s) => parse_timestamp(s).or_else(|| c.as_datetime()),
        _ => None,
    }
}

fn parse_bool_cell(row: usize, column: &str, c: &Data) -> IngestionResult<bool> {
    match c {
        Data::Bool(b) => Ok(*b),
        Data::Int(i) => Ok(*i != 0),
        Data::Float(f) => Ok(*f != 0.0),
        Data::String(s) => parse_bool_str(s).map_err(|message| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: s.clone(),
            message,
        }),
        _ => Err(parse_error(row, column, c, "expected bool")),
    }
}

fn parse_bool_str(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

fn parse_i64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<i64> {
    match c {
        Data::Int(i) => Ok(*i),
        Data::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        Data::Float(_) => Err(parse_error(
            row,
            column,
            c,
            "expected integer (got non-integer float)",
        )),
        Data::String(s) => s.trim().parse::<i64>().map_err(|e| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: s.clone(),
            message: e.to_string(),
        }),
        _ => Err(parse_error(row, column, c, "expected integer")),
    }
}

fn parse_f64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<f64> {
    match c {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().map_err(|e| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: s.clone(),
            message: e.to_string(),
        }),
        _ => Err(parse_error(row, column, c, "expected number")),
    }
}
