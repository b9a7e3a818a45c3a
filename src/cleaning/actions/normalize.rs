//! `normalize`: rescale a numeric column in place.
//!
//! Constant columns are not special-cased: `minmax` divides by zero and `zscore` divides by
//! a zero (or undefined) standard deviation, so the result holds `NaN`/`inf` values.

use std::fmt;

use serde::Deserialize;

use super::{decode_params, find_column, Action, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::stats;
use crate::types::{DataSet, DataType, Field, Value};

/// Rescaling method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// `(v - min) / (max - min)`.
    MinMax,
    /// `(v - mean) / std`, using the sample standard deviation.
    ZScore,
    /// Any other method name. The step is skipped.
    Unrecognized(String),
}

impl NormalizeMethod {
    fn from_name(name: &str) -> Self {
        match name {
            "minmax" => Self::MinMax,
            "zscore" => Self::ZScore,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinMax => f.write_str("minmax"),
            Self::ZScore => f.write_str("zscore"),
            Self::Unrecognized(name) => f.write_str(name),
        }
    }
}

/// Rescale `column` with `method`. The column becomes `Float64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalize {
    /// Column to rescale. `None` skips the step.
    pub column: Option<String>,
    pub method: NormalizeMethod,
}

#[derive(Deserialize)]
struct NormalizeParams {
    #[serde(default)]
    column: Option<String>,
    #[serde(default)]
    method: Option<String>,
}

impl Normalize {
    /// Rescale `column` with `method`.
    pub fn new(column: impl Into<String>, method: NormalizeMethod) -> Self {
        Self {
            column: Some(column.into()),
            method,
        }
    }
}

impl Transform for Normalize {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let Some(idx) = find_column(dataset, self.column.as_deref()) else {
            return Ok(StepEffect::skipped(format!(
                "column {:?} not found",
                self.column
            )));
        };
        let field = &dataset.schema.fields[idx];
        if !field.data_type.is_numeric() {
            return Ok(StepEffect::skipped(format!(
                "column '{}' is {}, not numeric",
                field.name, field.data_type
            )));
        }

        let values = stats::numeric_values(dataset, idx);
        let (offset, scale) = match &self.method {
            NormalizeMethod::MinMax => stats::min_max(&values)
                .map(|(lo, hi)| (lo, hi - lo))
                .unwrap_or((f64::NAN, f64::NAN)),
            NormalizeMethod::ZScore => match (stats::mean(&values), stats::sample_std(&values)) {
                (Some(m), Some(s)) => (m, s),
                _ => (f64::NAN, f64::NAN),
            },
            NormalizeMethod::Unrecognized(name) => {
                return Ok(StepEffect::skipped(format!(
                    "unrecognized normalize method '{name}'"
                )));
            }
        };

        let rescaled: Vec<Value> = dataset
            .column_values(idx)
            .map(|v| match v.as_f64() {
                Some(x) => Value::Float64((x - offset) / scale),
                None => Value::Null,
            })
            .collect();

        let out = dataset.with_column_replaced(
            idx,
            Field::new(&field.name, DataType::Float64),
            rescaled,
        );
        Ok(StepEffect::applied(
            out,
            format!("Normalized {} using {}", field.name, self.method),
        ))
    }
}

impl Action for Normalize {
    const NAME: &'static str = "normalize";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: NormalizeParams = decode_params(Self::NAME, params)?;
        Ok(Self {
            column: p.column,
            method: NormalizeMethod::from_name(p.method.as_deref().unwrap_or("minmax")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Schema;

    fn ints(values: &[Option<i64>]) -> DataSet {
        DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Int64)]),
            values
                .iter()
                .map(|v| vec![v.map(Value::Int64).unwrap_or(Value::Null)])
                .collect(),
        )
    }

    fn column(effect: StepEffect) -> Vec<Value> {
        match effect {
            StepEffect::Applied { dataset, .. } => {
                assert_eq!(dataset.schema.fields[0].data_type, DataType::Float64);
                dataset.column_values(0).cloned().collect()
            }
            other => panic!("expected applied, got {other:?}"),
        }
    }

    #[test]
    fn minmax_scales_into_unit_range() {
        let ds = ints(&[Some(1), Some(2), Some(3)]);
        let out = column(Normalize::new("x", NormalizeMethod::MinMax).apply(&ds).unwrap());
        assert_eq!(
            out,
            vec![Value::Float64(0.0), Value::Float64(0.5), Value::Float64(1.0)]
        );
    }

    #[test]
    fn zscore_uses_sample_std_and_keeps_nulls() {
        let ds = ints(&[Some(1), None, Some(2), Some(3)]);
        let out = column(Normalize::new("x", NormalizeMethod::ZScore).apply(&ds).unwrap());
        assert_eq!(
            out,
            vec![
                Value::Float64(-1.0),
                Value::Null,
                Value::Float64(0.0),
                Value::Float64(1.0)
            ]
        );
    }

    #[test]
    fn constant_column_propagates_nan() {
        let ds = ints(&[Some(4), Some(4)]);
        let out = column(Normalize::new("x", NormalizeMethod::MinMax).apply(&ds).unwrap());
        assert!(out.iter().all(|v| matches!(v, Value::Float64(f) if f.is_nan())));
    }

    #[test]
    fn skips_text_missing_and_unknown_method() {
        let text = DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Utf8)]),
            vec![vec![Value::Utf8("a".into())]],
        );
        let ds = ints(&[Some(1)]);
        for (step, data) in [
            (Normalize::new("x", NormalizeMethod::MinMax), &text),
            (Normalize::new("y", NormalizeMethod::MinMax), &ds),
            (Normalize::new("x", NormalizeMethod::Unrecognized("log".into())), &ds),
        ] {
            assert!(matches!(step.apply(data).unwrap(), StepEffect::Skipped { .. }));
        }
    }

    #[test]
    fn params_default_to_minmax() {
        let step = Normalize::from_params(&serde_json::json!({"column": "x"})).unwrap();
        assert_eq!(step.method, NormalizeMethod::MinMax);
    }
}
