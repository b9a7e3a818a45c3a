//! `convert_type`: coerce every value of a column to a target kind.
//!
//! Coercion is per value: anything that cannot be converted becomes [`Value::Null`].

use std::fmt;

use serde::Deserialize;

use super::{decode_params, find_column, Action, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::types::{parse_timestamp, timestamp_from_nanos, timestamp_to_nanos};
use crate::types::{DataSet, DataType, Field, Value};

/// Target of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionTarget {
    /// `Int64` when every converted value is integral, else `Float64`.
    Numeric,
    /// `Timestamp`. Numbers are read as nanoseconds since the Unix epoch.
    Datetime,
    /// `Utf8`.
    String,
    /// Any other target name. The step is skipped.
    Unrecognized(String),
}

impl ConversionTarget {
    fn from_name(name: &str) -> Self {
        match name {
            "numeric" => Self::Numeric,
            "datetime" => Self::Datetime,
            "string" => Self::String,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Datetime => f.write_str("datetime"),
            Self::String => f.write_str("string"),
            Self::Unrecognized(name) => f.write_str(name),
        }
    }
}

/// Convert `column` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertType {
    pub column: Option<String>,
    pub target: ConversionTarget,
}

#[derive(Deserialize)]
struct ConvertTypeParams {
    #[serde(default)]
    column: Option<String>,
    #[serde(default, rename = "type")]
    target: Option<String>,
}

impl ConvertType {
    pub fn new(column: impl Into<String>, target: ConversionTarget) -> Self {
        Self {
            column: Some(column.into()),
            target,
        }
    }
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::Int64(_) | Value::Float64(_) => value.clone(),
        Value::Bool(b) => Value::Int64(i64::from(*b)),
        Value::Timestamp(ts) => timestamp_to_nanos(ts).map_or(Value::Null, Value::Int64),
        Value::Utf8(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Int64)
                .or_else(|_| s.parse::<f64>().map(Value::Float64))
                .unwrap_or(Value::Null)
        }
        Value::Null => Value::Null,
    }
}

fn to_timestamp(value: &Value) -> Value {
    let ts = match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Utf8(s) => parse_timestamp(s),
        Value::Int64(n) => timestamp_from_nanos(*n),
        // Saturating cast; out-of-range values fail in timestamp_from_nanos.
        Value::Float64(f) if f.is_finite() => timestamp_from_nanos(*f as i64),
        _ => None,
    };
    ts.map_or(Value::Null, Value::Timestamp)
}

fn to_text(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Utf8(_) => value.clone(),
        other => Value::Utf8(other.to_string()),
    }
}

impl Transform for ConvertType {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let Some(idx) = find_column(dataset, self.column.as_deref()) else {
            return Ok(StepEffect::skipped(format!(
                "column {:?} not found",
                self.column
            )));
        };
        let name = &dataset.schema.fields[idx].name;

        let (data_type, values): (DataType, Vec<Value>) = match &self.target {
            ConversionTarget::Numeric => {
                let mut values: Vec<Value> = dataset.column_values(idx).map(to_number).collect();
                if values.iter().any(|v| matches!(v, Value::Float64(_))) {
                    for v in &mut values {
                        if let Value::Int64(i) = *v {
                            *v = Value::Float64(i as f64);
                        }
                    }
                    (DataType::Float64, values)
                } else {
                    (DataType::Int64, values)
                }
            }
            ConversionTarget::Datetime => (
                DataType::Timestamp,
                dataset.column_values(idx).map(to_timestamp).collect(),
            ),
            ConversionTarget::String => (
                DataType::Utf8,
                dataset.column_values(idx).map(to_text).collect(),
            ),
            ConversionTarget::Unrecognized(target) => {
                return Ok(StepEffect::skipped(format!(
                    "unrecognized conversion target '{target}'"
                )));
            }
        };

        let out = dataset.with_column_replaced(idx, Field::new(name, data_type), values);
        Ok(StepEffect::applied(
            out,
            format!("Converted {name} to {}", self.target),
        ))
    }
}

impl Action for ConvertType {
    const NAME: &'static str = "convert_type";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: ConvertTypeParams = decode_params(Self::NAME, params)?;
        Ok(Self {
            column: p.column,
            target: ConversionTarget::from_name(p.target.as_deref().unwrap_or_default()),
        })
    }
}
