//! Core data model types.
//!
//! Loaders produce an in-memory [`DataSet`] described by a [`Schema`] (a list of typed
//! [`Field`]s). Cleaning steps and the profiler both operate on this structure.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used when a timestamp is rendered as text.
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// ISO-8601 format used when a timestamp leaves the crate as JSON.
pub const TIMESTAMP_JSON_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%d %b %Y", "%b %d, %Y"];

/// Parse a date or date-time string in one of the common layouts.
///
/// RFC 3339 strings with an offset are converted to UTC. Date-only strings map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Date-time from nanoseconds since the Unix epoch.
pub fn timestamp_from_nanos(nanos: i64) -> Option<NaiveDateTime> {
    let secs = nanos.div_euclid(1_000_000_000);
    let sub = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs, sub).map(|dt| dt.naive_utc())
}

/// Nanoseconds since the Unix epoch, or `None` outside the representable range.
pub fn timestamp_to_nanos(ts: &NaiveDateTime) -> Option<i64> {
    ts.and_utc().timestamp_nanos_opt()
}

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Date-time without a timezone.
    Timestamp,
    /// Unresolved or mixed element type; cells may hold any [`Value`] variant.
    Mixed,
}

impl DataType {
    /// Returns `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Short tag used in reports and profiles.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
            Self::Timestamp => "timestamp",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Date-time without a timezone.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for nulls and NaN floats. Missing-value counts,
    /// imputation, row dropping and statistics all use this rule.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value. Only integers and floats have one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The narrowest [`DataType`] able to hold this value, or `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
            Self::Timestamp(_) => Some(DataType::Timestamp),
        }
    }

    /// Portable JSON scalar for this value.
    ///
    /// Non-finite floats become `null` and timestamps become ISO-8601 text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Int64(v) => serde_json::Value::from(*v),
            Self::Float64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Utf8(v) => serde_json::Value::String(v.clone()),
            Self::Timestamp(v) => {
                serde_json::Value::String(v.format(TIMESTAMP_JSON_FORMAT).to_string())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_DISPLAY_FORMAT)),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields, so every
/// column has exactly [`DataSet::row_count`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Iterate the values of the column at `idx`, in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset where the column at `idx` is replaced by `field` and `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly one value per row.
    pub fn with_column_replaced(&self, idx: usize, field: Field, values: Vec<Value>) -> Self {
        assert!(
            values.len() == self.row_count(),
            "replacement column length {} does not match row count {}",
            values.len(),
            self.row_count()
        );
        let mut schema = self.schema.clone();
        schema.fields[idx] = field;
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut out = row.clone();
                out[idx] = v;
                out
            })
            .collect();
        Self { schema, rows }
    }

    /// Create a new dataset with `field` appended as the last column.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly one value per row.
    pub fn with_column_appended(&self, field: Field, values: Vec<Value>) -> Self {
        assert!(
            values.len() == self.row_count(),
            "appended column length {} does not match row count {}",
            values.len(),
            self.row_count()
        );
        let mut schema = self.schema.clone();
        schema.fields.push(field);
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut out = Vec::with_capacity(row.len() + 1);
                out.extend(row.iter().cloned());
                out.push(v);
                out
            })
            .collect();
        Self { schema, rows }
    }

    /// Create a new dataset keeping only the columns whose index satisfies `keep`.
    ///
    /// Column order is preserved.
    pub fn select_columns<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize, &Field) -> bool,
    {
        let kept: Vec<usize> = self
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(i, f)| keep(*i, f))
            .map(|(i, _)| i)
            .collect();
        let schema = Schema::new(kept.iter().map(|&i| self.schema.fields[i].clone()).collect());
        let rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Self { schema, rows }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }
}
