//! Parquet export.
//!
//! Every column is written as an `OPTIONAL` leaf so nulls survive through definition levels.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::basic::{ConvertedType, Repetition, Type as PhysicalType};
use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::Type as SchemaType;

use crate::error::ExportResult;
use crate::types::{DataSet, DataType, Schema, Value};

/// Write `ds` to `path` as a single-row-group Parquet file.
///
/// | `DataType`  | Parquet leaf                    |
/// |-------------|---------------------------------|
/// | `Int64`     | `INT64`                         |
/// | `Float64`   | `DOUBLE`                        |
/// | `Bool`      | `BOOLEAN`                       |
/// | `Utf8`      | `BYTE_ARRAY (UTF8)`             |
/// | `Timestamp` | `INT64 (TIMESTAMP_MICROS)`      |
/// | `Mixed`     | `BYTE_ARRAY (UTF8)`, cell text  |
pub fn write_parquet_to_path(ds: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let schema = Arc::new(parquet_schema(&ds.schema)?);
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;

    let mut rg = writer.next_row_group()?;
    let mut col_idx: usize = 0;
    while let Some(mut col) = rg.next_column()? {
        let field = &ds.schema.fields[col_idx];
        let cells: Vec<&Value> = ds.column_values(col_idx).collect();

        match col.untyped() {
            ColumnWriter::Int64ColumnWriter(w) => {
                let (values, def_levels) = match field.data_type {
                    DataType::Timestamp => present_values(&cells, timestamp_micros),
                    _ => present_values(&cells, |v| match v {
                        Value::Int64(i) => Some(*i),
                        _ => None,
                    }),
                };
                w.write_batch(&values, Some(&def_levels), None)?;
            }
            ColumnWriter::DoubleColumnWriter(w) => {
                let (values, def_levels) = present_values(&cells, Value::as_f64);
                w.write_batch(&values, Some(&def_levels), None)?;
            }
            ColumnWriter::BoolColumnWriter(w) => {
                let (values, def_levels) = present_values(&cells, |v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                });
                w.write_batch(&values, Some(&def_levels), None)?;
            }
            ColumnWriter::ByteArrayColumnWriter(w) => {
                let (values, def_levels) = present_values(&cells, |v| {
                    (!v.is_null()).then(|| ByteArray::from(v.to_string().as_str()))
                });
                w.write_batch(&values, Some(&def_levels), None)?;
            }
            _ => {
                return Err(ParquetError::General(format!("no writer for column '{}'", field.name)).into());
            }
        }
        col.close()?;
        col_idx += 1;
    }
    rg.close()?;
    writer.close()?;
    Ok(())
}

/// Values that convert, plus one definition level per cell (0 for nulls and misfits).
fn present_values<T>(cells: &[&Value], convert: impl Fn(&Value) -> Option<T>) -> (Vec<T>, Vec<i16>) {
    let mut values = Vec::with_capacity(cells.len());
    let mut def_levels = Vec::with_capacity(cells.len());
    for v in cells {
        match convert(v) {
            Some(x) => {
                values.push(x);
                def_levels.push(1);
            }
            None => def_levels.push(0),
        }
    }
    (values, def_levels)
}

fn parquet_schema(schema: &Schema) -> Result<SchemaType, ParquetError> {
    let fields = schema
        .fields
        .iter()
        .map(|f| {
            let (physical, converted) = match f.data_type {
                DataType::Int64 => (PhysicalType::INT64, ConvertedType::NONE),
                DataType::Float64 => (PhysicalType::DOUBLE, ConvertedType::NONE),
                DataType::Bool => (PhysicalType::BOOLEAN, ConvertedType::NONE),
                DataType::Timestamp => (PhysicalType::INT64, ConvertedType::TIMESTAMP_MICROS),
                DataType::Utf8 | DataType::Mixed => (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8),
            };
            SchemaType::primitive_type_builder(&f.name, physical)
                .with_repetition(Repetition::OPTIONAL)
                .with_converted_type(converted)
                .build()
                .map(Arc::new)
        })
        .collect::<Result<Vec<_>, _>>()?;

    SchemaType::group_type_builder("schema").with_fields(fields).build()
}

fn timestamp_micros(v: &Value) -> Option<i64> {
    match v {
        Value::Timestamp(ts) => Some(ts.and_utc().timestamp_micros()),
        _ => None,
    }
}
