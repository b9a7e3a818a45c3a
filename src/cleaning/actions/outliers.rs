//! `flag_outliers`: mark values outside Tukey's fences (`1.5 * IQR` beyond the quartiles).
//!
//! Missing and non-numeric cells are never flagged.

use serde::Deserialize;

use super::{decode_params, find_column, Action, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::stats::{self, TukeyFences};
use crate::types::{DataSet, DataType, Field, Value};

/// Suffix of the flag column added by [`FlagOutliers`].
pub const OUTLIER_COLUMN_SUFFIX: &str = "_is_outlier";

/// Add a boolean `<column>_is_outlier` column marking values outside Tukey's fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagOutliers {
    /// Column to inspect. `None` skips the step.
    pub column: Option<String>,
}

#[derive(Deserialize)]
struct FlagOutliersParams {
    #[serde(default)]
    column: Option<String>,
}

impl FlagOutliers {
    /// Flag outliers in `column`.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
        }
    }
}

impl Transform for FlagOutliers {
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

        // No non-null values means no fences; nothing can be an outlier.
        let fences = TukeyFences::from_values(&stats::numeric_values(dataset, idx));
        let flags: Vec<Value> = dataset
            .column_values(idx)
            .map(|v| Value::Bool(fences.is_some_and(|f| f.flags(v))))
            .collect();

        let flag_field = Field::new(format!("{}{OUTLIER_COLUMN_SUFFIX}", field.name), DataType::Bool);
        let out = match dataset.schema.index_of(&flag_field.name) {
            Some(existing) => dataset.with_column_replaced(existing, flag_field, flags),
            None => dataset.with_column_appended(flag_field, flags),
        };
        Ok(StepEffect::applied(
            out,
            format!("Flagged outliers in {}", field.name),
        ))
    }
}

impl Action for FlagOutliers {
    const NAME: &'static str = "flag_outliers";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: FlagOutliersParams = decode_params(Self::NAME, params)?;
        Ok(Self { column: p.column })
    }
}
