//! Rule-based cleaning plan suggestions.
//!
//! [`suggest_plan`] reads a [`DatasetProfile`] and proposes steps in this order:
//!
//! 1. `drop_duplicates` when the profile counts duplicate rows.
//! 2. For each column with missing values, `impute` with the `mean` (numeric columns) or
//!    the `mode` (everything else).
//! 3. For each column with Tukey outliers, `flag_outliers`.
//!
//! Steps 2 and 3 interleave per column, in column order. Every step carries a one-line
//! `reasoning`; the plan parser ignores that key, so the suggestions run as they are.
//!
//! ```rust
//! use rust_data_cleaning::cleaning::apply_plan;
//! use rust_data_cleaning::planning::suggest_plan;
//! use rust_data_cleaning::profiling::profile;
//! use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("x", DataType::Float64)]),
//!     vec![vec![Value::Float64(1.0)], vec![Value::Null], vec![Value::Float64(3.0)]],
//! );
//! let suggestions = suggest_plan(&profile(&ds));
//! assert_eq!(suggestions.steps()[0].action, "impute");
//!
//! let out = apply_plan(&ds, &suggestions.to_plan()?);
//! assert_eq!(out.dataset.rows[1][0], Value::Float64(2.0));
//! # Ok::<(), rust_data_cleaning::PlanError>(())
//! ```

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::cleaning::{ActionRegistry, Plan};
use crate::error::PlanResult;
use crate::profiling::{ColumnProfile, DatasetProfile};
use crate::types::DataType;

/// One proposed step, shaped like a plan step plus its `reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedStep {
    pub action: String,
    pub params: serde_json::Value,
    pub reasoning: String,
}

impl SuggestedStep {
    fn new(action: &str, params: serde_json::Value, reasoning: String) -> Self {
        Self {
            action: action.to_string(),
            params,
            reasoning,
        }
    }
}

/// Ordered suggestions. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SuggestedPlan {
    steps: Vec<SuggestedStep>,
}

impl SuggestedPlan {
    pub fn steps(&self) -> &[SuggestedStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve the suggestions into an executable [`Plan`] with the built-in actions.
    pub fn to_plan(&self) -> PlanResult<Plan> {
        let value = serde_json::to_value(self)?;
        Plan::from_value_with(value, &ActionRegistry::builtin())
    }
}

/// Propose cleaning steps for the profiled dataset.
pub fn suggest_plan(profile: &DatasetProfile) -> SuggestedPlan {
    let mut steps = Vec::new();

    if profile.duplicates > 0 {
        steps.push(SuggestedStep::new(
            "drop_duplicates",
            json!({}),
            format!("Found {} duplicate rows.", profile.duplicates),
        ));
    }

    for column in &profile.column_stats {
        if column.missing > 0 {
            let strategy = if is_numeric_column(column) { "mean" } else { "mode" };
            steps.push(SuggestedStep::new(
                "impute",
                json!({"column": column.name, "strategy": strategy}),
                format!(
                    "Column '{}' has {} missing values. Imputing with {strategy}.",
                    column.name, column.missing
                ),
            ));
        }

        let outliers = column.numeric.as_ref().map_or(0, |n| n.outliers);
        if outliers > 0 {
            steps.push(SuggestedStep::new(
                "flag_outliers",
                json!({"column": column.name}),
                format!("Column '{}' has {outliers} potential outliers.", column.name),
            ));
        }
    }

    debug!(steps = steps.len(), "suggested cleaning plan");
    SuggestedPlan { steps }
}

fn is_numeric_column(column: &ColumnProfile) -> bool {
    [DataType::Int64, DataType::Float64]
        .iter()
        .any(|t| t.as_str() == column.data_type)
}
