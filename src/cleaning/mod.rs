//! Declarative cleaning plans.
//!
//! - [`plan`]: JSON plan parsing and the [`ActionRegistry`]
//! - [`actions`]: the built-in [`Transform`]s
//! - [`report`]: the per-step execution [`Report`]
//!
//! Plans are run by [`crate::execution::CleaningExecutor`]; [`apply_plan`] is a shorthand for
//! a default executor.
//!
//! ```rust
//! use rust_data_cleaning::cleaning::{apply_plan, Plan};
//! use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("x", DataType::Int64)]),
//!     vec![vec![Value::Int64(1)], vec![Value::Null], vec![Value::Int64(3)]],
//! );
//! let plan = Plan::from_json_str(
//!     r#"[{"action": "impute", "params": {"column": "x", "strategy": "mean"}}]"#,
//! )?;
//! let out = apply_plan(&ds, &plan);
//! assert_eq!(out.dataset.rows[1][0], Value::Int64(2));
//! assert_eq!(out.report.messages(), vec!["Imputed 1 missing values in x with mean (2)"]);
//! # Ok::<(), rust_data_cleaning::PlanError>(())
//! ```

pub mod actions;
pub mod plan;
pub mod report;

pub use actions::{Action, StepEffect, StepResult, Transform};
pub use plan::{ActionRegistry, Plan, PlanStep, StepKind};
pub use report::{Report, ReportEntry, StepOutcome};

use crate::execution::{CleaningExecutor, CleaningOutcome};
use crate::types::DataSet;

/// Run `plan` over `dataset` with a default [`CleaningExecutor`].
pub fn apply_plan(dataset: &DataSet, plan: &Plan) -> CleaningOutcome {
    CleaningExecutor::new().apply(dataset, plan)
}
