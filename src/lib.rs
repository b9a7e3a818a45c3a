//! `rust-data-cleaning` applies declarative cleaning plans to in-memory tables and profiles
//! them.
//!
//! A table is a [`types::DataSet`]: a [`types::Schema`] of typed columns plus row-major
//! [`types::Value`]s. Datasets come from files through [`ingestion::load_from_path`] and go
//! back out through [`export::save_to_path`].
//!
//! ## Cleaning
//!
//! A [`cleaning::Plan`] is a JSON array of steps such as
//! `{"action": "impute", "params": {"column": "age", "strategy": "median"}}`. The
//! [`execution::CleaningExecutor`] applies the steps in order and returns the evolved dataset
//! with a [`cleaning::Report`]. A failing step is recorded in the report and leaves the
//! dataset as it was; the run always continues.
//!
//! Built-in actions: `drop_duplicates`, `drop_missing`, `impute`, `drop_columns`,
//! `normalize`, `convert_type`, `flag_outliers`. Unrecognized actions are ignored.
//!
//! ```rust
//! use rust_data_cleaning::cleaning::{apply_plan, Plan};
//! use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("v", DataType::Int64)]),
//!     [1, 2, 3, 4, 100].iter().map(|v| vec![Value::Int64(*v)]).collect(),
//! );
//! let plan = Plan::from_json_str(r#"[{"action": "flag_outliers", "params": {"column": "v"}}]"#)?;
//! let out = apply_plan(&ds, &plan);
//! assert_eq!(out.dataset.rows[4][1], Value::Bool(true));
//! assert_eq!(out.report.messages(), vec!["Flagged outliers in v"]);
//! # Ok::<(), rust_data_cleaning::PlanError>(())
//! ```
//!
//! ## Profiling
//!
//! [`profiling::profile`] computes per-column type, missingness, cardinality and, for numeric
//! columns, mean, standard deviation, range and a Tukey outlier count.
//! [`planning::suggest_plan`] turns a profile into a suggested plan: drop duplicates, impute
//! missing values, flag outliers.
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`stats`]: numeric kernels shared by cleaning and profiling
//! - [`cleaning`]: plans, actions and reports
//! - [`execution`]: the plan executor, its observer and metrics
//! - [`profiling`]: dataset profiles
//! - [`planning`]: rule-based plan suggestions
//! - [`ingestion`] / [`export`]: file loading and saving
//! - [`envelope`]: JSON result framing
//! - [`logging`]: `tracing` subscriber setup
//! - [`error`]: error types

pub mod cleaning;
pub mod envelope;
pub mod error;
pub mod execution;
pub mod export;
pub mod ingestion;
pub mod logging;
pub mod planning;
pub mod profiling;
pub mod stats;
pub mod types;

pub use error::{
    ExportError, ExportResult, IngestionError, IngestionResult, PlanError, PlanResult, ProfileError, StepError,
};
