//! `impute`: fill missing values (nulls and NaN) in one column.

use std::fmt;

use serde::Deserialize;

use super::{decode_params, find_column, Action, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::stats;
use crate::types::{DataSet, DataType, Field, Value};

/// How the fill value is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum ImputeStrategy {
    /// Arithmetic mean of the non-null values.
    Mean,
    /// Median of the non-null values.
    Median,
    /// Most frequent non-null value (smallest on ties).
    Mode,
    /// A literal supplied in the plan. `Value::Null` means no literal was given.
    Value(Value),
    /// Any other strategy name. Imputation is skipped.
    Unrecognized(String),
}

impl ImputeStrategy {
    fn from_name(name: &str, literal: Value) -> Self {
        match name {
            "mean" => Self::Mean,
            "median" => Self::Median,
            "mode" => Self::Mode,
            "value" => Self::Value(literal),
            other => Self::Unrecognized(other.to_string()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Value(_) => "value",
            Self::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replace every null in `column` with a computed or literal fill value.
#[derive(Debug, Clone, PartialEq)]
pub struct Impute {
    /// Target column. `None` (no column given) skips the step.
    pub column: Option<String>,
    /// Fill strategy.
    pub strategy: ImputeStrategy,
}

#[derive(Deserialize)]
struct ImputeParams {
    #[serde(default)]
    column: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl Impute {
    /// Impute `column` with `strategy`.
    pub fn new(column: impl Into<String>, strategy: ImputeStrategy) -> Self {
        Self {
            column: Some(column.into()),
            strategy,
        }
    }

    fn fill_value(&self, dataset: &DataSet, idx: usize) -> Result<Option<Value>, StepError> {
        let field = &dataset.schema.fields[idx];
        let numeric = |statistic: &'static str| -> Result<Vec<f64>, StepError> {
            if !field.data_type.is_numeric() {
                return Err(StepError::UnsupportedType {
                    column: field.name.clone(),
                    statistic,
                    data_type: field.data_type,
                });
            }
            Ok(stats::numeric_values(dataset, idx))
        };

        Ok(match &self.strategy {
            ImputeStrategy::Mean => stats::mean(&numeric("mean")?).map(Value::Float64),
            ImputeStrategy::Median => stats::median(&numeric("median")?).map(Value::Float64),
            ImputeStrategy::Mode => stats::mode(dataset.column_values(idx)),
            ImputeStrategy::Value(Value::Null) => None,
            ImputeStrategy::Value(v) => Some(v.clone()),
            ImputeStrategy::Unrecognized(_) => None,
        })
    }
}

impl Transform for Impute {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let Some(idx) = find_column(dataset, self.column.as_deref()) else {
            return Ok(StepEffect::skipped(format!(
                "column {:?} not found",
                self.column
            )));
        };
        if let ImputeStrategy::Unrecognized(name) = &self.strategy {
            return Ok(StepEffect::skipped(format!(
                "unrecognized impute strategy '{name}'"
            )));
        }
        let Some(fill) = self.fill_value(dataset, idx)? else {
            return Ok(StepEffect::skipped("fill value is null"));
        };

        let field = &dataset.schema.fields[idx];
        let missing = dataset.column_values(idx).filter(|v| v.is_missing()).count();
        let (data_type, cast) = fill_target(field.data_type, &fill);

        let values: Vec<Value> = dataset
            .column_values(idx)
            .map(|v| if v.is_missing() { cast(&fill) } else { cast(v) })
            .collect();

        let out = dataset.with_column_replaced(idx, Field::new(&field.name, data_type), values);
        Ok(StepEffect::applied(
            out,
            format!(
                "Imputed {missing} missing values in {} with {} ({fill})",
                field.name, self.strategy
            ),
        ))
    }
}

type Cast = fn(&Value) -> Value;

/// Decide the column type after filling with `fill`, plus the cast applied to each cell.
fn fill_target(column_type: DataType, fill: &Value) -> (DataType, Cast) {
    fn keep(v: &Value) -> Value {
        v.clone()
    }
    fn to_float(v: &Value) -> Value {
        v.as_f64().map(Value::Float64).unwrap_or_else(|| v.clone())
    }
    fn to_int(v: &Value) -> Value {
        match v {
            Value::Float64(f) => Value::Int64(*f as i64),
            other => other.clone(),
        }
    }

    match (column_type, fill) {
        (DataType::Int64, Value::Int64(_)) => (DataType::Int64, keep as Cast),
        (DataType::Int64, Value::Float64(f)) if f.is_finite() && f.fract() == 0.0 => {
            (DataType::Int64, to_int as Cast)
        }
        (DataType::Int64, Value::Float64(_)) => (DataType::Float64, to_float as Cast),
        (DataType::Float64, Value::Int64(_) | Value::Float64(_)) => {
            (DataType::Float64, to_float as Cast)
        }
        (t, v) if v.data_type() == Some(t) => (t, keep as Cast),
        _ => (DataType::Mixed, keep as Cast),
    }
}

fn literal_value(action: &str, raw: Option<serde_json::Value>) -> Result<Value, StepError> {
    Ok(match raw {
        None | Some(serde_json::Value::Null) => Value::Null,
        Some(serde_json::Value::Bool(b)) => Value::Bool(b),
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => Value::Float64(n.as_f64().unwrap_or(f64::NAN)),
        },
        Some(serde_json::Value::String(s)) => Value::Utf8(s),
        Some(other) => {
            return Err(StepError::InvalidParams {
                action: action.to_string(),
                message: format!("fill value must be a scalar, got {other}"),
            });
        }
    })
}

impl Action for Impute {
    const NAME: &'static str = "impute";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: ImputeParams = decode_params(Self::NAME, params)?;
        let literal = literal_value(Self::NAME, p.value)?;
        let strategy = ImputeStrategy::from_name(p.strategy.as_deref().unwrap_or("mean"), literal);
        Ok(Self {
            column: p.column,
            strategy,
        })
    }
}
