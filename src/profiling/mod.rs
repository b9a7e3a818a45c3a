//! Dataset profiling.
//!
//! [`profile`] makes one pass over a [`DataSet`] and reports, per column, the declared type,
//! missingness, cardinality and a few sample values. Numeric columns additionally get mean,
//! sample standard deviation, range and a Tukey outlier count (the same fences
//! `flag_outliers` uses).
//!
//! Profiling is total: a column whose numeric summary cannot be computed simply has no
//! numeric fields. Every value in the result is a plain JSON scalar, so the profile
//! serializes as-is:
//!
//! ```rust
//! use rust_data_cleaning::profiling::profile;
//! use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("x", DataType::Float64)]),
//!     vec![vec![Value::Float64(1.0)], vec![Value::Null]],
//! );
//! let p = profile(&ds);
//! let json = serde_json::to_value(&p).unwrap();
//! assert_eq!(json["column_stats"]["x"]["missing_pct"], 50.0);
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::ProfileError;
use crate::stats::{self, TukeyFences};
use crate::types::{DataSet, Field, Value};

/// Knobs for [`profile_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Number of leading rows copied into [`DatasetProfile::head`].
    pub preview_rows: usize,
    /// Maximum number of non-null sample values per column.
    pub sample_values: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            sample_values: 5,
        }
    }
}

/// Dataset-level profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    /// Rows identical to an earlier row across every column.
    pub duplicates: usize,
    /// Approximate in-memory footprint in bytes.
    pub memory_usage: usize,
    /// Per-column statistics in column order. Serialized as a map keyed by column name.
    #[serde(serialize_with = "serialize_columns")]
    pub column_stats: Vec<ColumnProfile>,
    /// First rows as `column -> value` objects.
    pub head: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl DatasetProfile {
    /// Statistics for `name`, if the dataset has that column.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_stats.iter().find(|c| c.name == name)
    }
}

fn serialize_columns<S: Serializer>(columns: &[ColumnProfile], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(columns.len()))?;
    for c in columns {
        map.serialize_entry(&c.name, c)?;
    }
    map.end()
}

/// Per-column statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    #[serde(skip)]
    pub name: String,
    /// Declared type tag (`int64`, `utf8`, ...).
    #[serde(rename = "type")]
    pub data_type: String,
    pub missing: usize,
    /// `missing / rows * 100`, or `0` for an empty dataset.
    pub missing_pct: f64,
    /// Distinct non-null values.
    pub unique: usize,
    pub sample: Vec<serde_json::Value>,
    /// Present for numeric columns with at least one value.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Distribution summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Values outside Tukey's fences.
    pub outliers: usize,
}

/// Profile `dataset` with [`ProfileOptions::default`].
pub fn profile(dataset: &DataSet) -> DatasetProfile {
    profile_with_options(dataset, &ProfileOptions::default())
}

/// Profile `dataset`.
pub fn profile_with_options(dataset: &DataSet, options: &ProfileOptions) -> DatasetProfile {
    let column_stats = dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| profile_column(dataset, idx, field, options))
        .collect();

    let head = dataset
        .rows
        .iter()
        .take(options.preview_rows)
        .map(|row| {
            dataset
                .schema
                .field_names()
                .zip(row)
                .map(|(name, v)| (name.to_string(), v.to_json()))
                .collect()
        })
        .collect();

    DatasetProfile {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        duplicates: stats::duplicate_mask(dataset).into_iter().filter(|d| *d).count(),
        memory_usage: memory_usage(dataset),
        column_stats,
        head,
    }
}

fn profile_column(dataset: &DataSet, idx: usize, field: &Field, options: &ProfileOptions) -> ColumnProfile {
    let rows = dataset.row_count();
    let missing = dataset.column_values(idx).filter(|v| v.is_missing()).count();
    let missing_pct = if rows == 0 {
        0.0
    } else {
        missing as f64 / rows as f64 * 100.0
    };

    let numeric = if field.data_type.is_numeric() {
        match numeric_summary(dataset, idx, field) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::debug!(column = %field.name, "omitting numeric summary: {e}");
                None
            }
        }
    } else {
        None
    };

    ColumnProfile {
        name: field.name.clone(),
        data_type: field.data_type.to_string(),
        missing,
        missing_pct,
        unique: stats::distinct_count(dataset, idx),
        sample: dataset
            .column_values(idx)
            .filter(|v| !v.is_missing())
            .take(options.sample_values)
            .map(Value::to_json)
            .collect(),
        numeric,
    }
}

fn numeric_summary(dataset: &DataSet, idx: usize, field: &Field) -> Result<NumericSummary, ProfileError> {
    let values = stats::numeric_values(dataset, idx);
    let no_values = || ProfileError::NoNumericValues {
        column: field.name.clone(),
    };
    let mean = stats::mean(&values).ok_or_else(no_values)?;
    let (min, max) = stats::min_max(&values).ok_or_else(no_values)?;
    let fences = TukeyFences::from_values(&values).ok_or_else(no_values)?;
    let std = stats::sample_std(&values).filter(|s| s.is_finite());

    Ok(NumericSummary {
        mean,
        std,
        min,
        max,
        outliers: values.iter().filter(|v| fences.is_outlier(**v)).count(),
    })
}

/// Rough byte size: one [`Value`] slot per cell plus heap bytes held by text, and the
/// column names.
fn memory_usage(dataset: &DataSet) -> usize {
    let names: usize = dataset.schema.field_names().map(str::len).sum();
    dataset.reduce_rows(names, |acc, row| {
        acc + row
            .iter()
            .map(|v| {
                std::mem::size_of::<Value>()
                    + match v {
                        Value::Utf8(s) => s.capacity(),
                        _ => 0,
                    }
            })
            .sum::<usize>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Schema};

    fn sample() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("v", DataType::Float64),
                Field::new("name", DataType::Utf8),
                Field::new("empty", DataType::Int64),
            ]),
            vec![
                vec![Value::Float64(1.0), Value::Utf8("a".into()), Value::Null],
                vec![Value::Float64(2.0), Value::Utf8("b".into()), Value::Null],
                vec![Value::Float64(3.0), Value::Null, Value::Null],
                vec![Value::Float64(4.0), Value::Utf8("a".into()), Value::Null],
                vec![Value::Float64(100.0), Value::Utf8("c".into()), Value::Null],
            ],
        )
    }

    #[test]
    fn numeric_column_gets_summary() {
        let p = profile(&sample());
        let v = p.column("v").unwrap();
        let n = v.numeric.as_ref().unwrap();
        assert_eq!(n.mean, 22.0);
        assert_eq!(n.min, 1.0);
        assert_eq!(n.max, 100.0);
        assert_eq!(n.outliers, 1);
        assert!(n.std.unwrap() > 40.0);
        assert_eq!(v.unique, 5);
    }

    #[test]
    fn text_column_has_no_numeric_fields() {
        let p = profile(&sample());
        let name = p.column("name").unwrap();
        assert_eq!(name.missing, 1);
        assert_eq!(name.missing_pct, 20.0);
        assert_eq!(name.unique, 3);
        assert_eq!(
            name.sample,
            vec![
                serde_json::json!("a"),
                serde_json::json!("b"),
                serde_json::json!("a"),
                serde_json::json!("c")
            ]
        );
        assert!(name.numeric.is_none());
    }

    #[test]
    fn all_null_numeric_column_omits_summary() {
        let p = profile(&sample());
        let json = serde_json::to_value(&p).unwrap();
        let empty = json["column_stats"]["empty"].as_object().unwrap();
        assert_eq!(empty["type"], "int64");
        assert_eq!(empty["missing"], 5);
        assert!(!empty.contains_key("mean"));
        assert!(!empty.contains_key("outliers"));
    }

    #[test]
    fn single_value_std_is_null() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Int64)]),
            vec![vec![Value::Int64(7)]],
        );
        let json = serde_json::to_value(profile(&ds)).unwrap();
        assert_eq!(json["column_stats"]["x"]["std"], serde_json::Value::Null);
        assert_eq!(json["column_stats"]["x"]["mean"], 7.0);
    }

    #[test]
    fn zero_rows_report_zero_missing_pct() {
        let ds = DataSet::new(sample().schema, vec![]);
        let p = profile(&ds);
        assert_eq!(p.rows, 0);
        assert!(p.column_stats.iter().all(|c| c.missing_pct == 0.0));
        assert!(p.head.is_empty());
    }

    #[test]
    fn head_and_duplicates_follow_options() {
        let mut ds = sample();
        ds.rows.push(ds.rows[0].clone());
        let p = profile_with_options(
            &ds,
            &ProfileOptions {
                preview_rows: 2,
                sample_values: 1,
            },
        );
        assert_eq!(p.duplicates, 1);
        assert_eq!(p.head.len(), 2);
        assert_eq!(
            p.head[0].keys().collect::<Vec<_>>(),
            vec!["v", "name", "empty"]
        );
        assert_eq!(p.column("name").unwrap().sample.len(), 1);
        assert!(p.memory_usage > 0);
    }
}
