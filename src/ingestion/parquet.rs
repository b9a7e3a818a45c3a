//! Parquet ingestion implementation.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field as ParquetField;
use parquet::schema::types::Type as SchemaType;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{timestamp_from_nanos, DataSet, DataType, Field, Schema, Value};

/// Ingest a Parquet file into an in-memory `DataSet`.
///
/// Notes:
/// - Validates that all schema fields exist as Parquet leaf columns (by column path string)
/// - Uses the Parquet record API (`RowIter`)
pub fn ingest_parquet_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let available_columns = parquet_leaf_column_paths(&reader);
    for field in &schema.fields {
        if !available_columns.contains(field.name.as_str()) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("missing required column '{}'", field.name),
            });
        }
    }

    read_rows(reader, schema)
}

/// Ingest a Parquet file using the types declared in its own schema.
///
/// Every top-level column is loaded. See [`parquet_schema_to_schema`] for the type mapping.
pub fn load_parquet_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;
    let schema = parquet_schema_to_schema(reader.metadata().file_metadata().schema());
    read_rows(reader, &schema)
}

/// Map the top-level columns of a Parquet schema to a [`Schema`].
///
/// Booleans, integers, floats and UTF-8 byte arrays map to their obvious types;
/// `DATE` and `TIMESTAMP_*` annotated integers become `Timestamp`. Anything else (groups,
/// lists, raw binary) is `Mixed`.
pub fn parquet_schema_to_schema(root: &SchemaType) -> Schema {
    let fields = root
        .get_fields()
        .iter()
        .map(|t| Field::new(t.name(), parquet_column_type(t)))
        .collect();
    Schema::new(fields)
}

fn parquet_column_type(t: &SchemaType) -> DataType {
    if !t.is_primitive() {
        return DataType::Mixed;
    }
    let converted = t.get_basic_info().converted_type();
    match (t.get_physical_type(), converted) {
        (PhysicalType::BOOLEAN, _) => DataType::Bool,
        (
            PhysicalType::INT32 | PhysicalType::INT64,
            ConvertedType::DATE | ConvertedType::TIMESTAMP_MILLIS | ConvertedType::TIMESTAMP_MICROS,
        ) => DataType::Timestamp,
        (PhysicalType::INT96, _) => DataType::Timestamp,
        (PhysicalType::INT32 | PhysicalType::INT64, _) => DataType::Int64,
        (PhysicalType::FLOAT | PhysicalType::DOUBLE, _) => DataType::Float64,
        (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON) => {
            DataType::Utf8
        }
        _ => DataType::Mixed,
    }
}

fn read_rows(reader: SerializedFileReader<File>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;

        // Build a name->Field map for lookup.
        let map: HashMap<&str, &ParquetField> = row
            .get_column_iter()
            .map(|(name, field)| (name.as_str(), field))
            .collect();

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for f in &schema.fields {
            let v = map.get(f.name.as_str()).ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row_num} missing required column '{}'", f.name),
            })?;
            out_row.push(convert_parquet_field(row_num, &f.name, f.data_type, v)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> HashSet<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn convert_parquet_field(
    row: usize,
    column: &str,
    data_type: DataType,
    f: &ParquetField,
) -> IngestionResult<Value> {
    if matches!(f, ParquetField::Null) {
        return Ok(Value::Null);
    }
    let parse_err = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: f.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => match f {
            ParquetField::Str(s) => Ok(Value::Utf8(s.clone())),
            _ => Err(parse_err("expected string")),
        },
        DataType::Bool => match f {
            ParquetField::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(parse_err("expected bool")),
        },
        DataType::Int64 => integer_of(f)
            .ok_or_else(|| parse_err("expected integer"))?
            .map(Value::Int64)
            .map_err(|_| parse_err("u64 out of range for i64")),
        DataType::Float64 => match f {
            ParquetField::Float(v) => Ok(Value::Float64(f64::from(*v))),
            ParquetField::Double(v) => Ok(Value::Float64(*v)),
            _ => Err(parse_err("expected number")),
        },
        DataType::Timestamp => timestamp_of(f)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_err("expected date or timestamp")),
        DataType::Mixed => Ok(mixed_value(f)),
    }
}

fn integer_of(f: &ParquetField) -> Option<Result<i64, std::num::TryFromIntError>> {
    Some(match f {
        ParquetField::Byte(v) => Ok(i64::from(*v)),
        ParquetField::Short(v) => Ok(i64::from(*v)),
        ParquetField::Int(v) => Ok(i64::from(*v)),
        ParquetField::Long(v) => Ok(*v),
        ParquetField::UByte(v) => Ok(i64::from(*v)),
        ParquetField::UShort(v) => Ok(i64::from(*v)),
        ParquetField::UInt(v) => Ok(i64::from(*v)),
        ParquetField::ULong(v) => i64::try_from(*v),
        _ => return None,
    })
}

fn timestamp_of(f: &ParquetField) -> Option<chrono::NaiveDateTime> {
    match f {
        ParquetField::TimestampMillis(ms) => timestamp_from_nanos(ms.checked_mul(1_000_000)?),
        ParquetField::TimestampMicros(us) => timestamp_from_nanos(us.checked_mul(1_000)?),
        ParquetField::Date(days) => {
            timestamp_from_nanos(i64::from(*days).checked_mul(86_400 * 1_000_000_000)?)
        }
        ParquetField::Long(ns) => timestamp_from_nanos(*ns),
        _ => None,
    }
}

fn mixed_value(f: &ParquetField) -> Value {
    if let Some(Ok(i)) = integer_of(f) {
        return Value::Int64(i);
    }
    if let Some(ts) = timestamp_of(f) {
        return Value::Timestamp(ts);
    }
    match f {
        ParquetField::Bool(b) => Value::Bool(*b),
        ParquetField::Float(v) => Value::Float64(f64::from(*v)),
        ParquetField::Double(v) => Value::Float64(*v),
        ParquetField::Str(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}
