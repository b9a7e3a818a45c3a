//! Built-in cleaning actions.
//!
//! Every action is a small struct holding its already-decoded parameters and implementing
//! [`Transform`]. A transform never mutates its input: it either builds a fresh
//! [`DataSet`] ([`StepEffect::Applied`]), declines to act ([`StepEffect::Skipped`]), or
//! fails with a [`StepError`]. That makes each action testable on its own and keeps a failed
//! step from leaking a partial change into the executor's working copy.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::StepError;
use crate::types::DataSet;

mod columns;
mod convert;
mod impute;
mod normalize;
mod outliers;
mod rows;

pub use columns::DropColumns;
pub use convert::{ConversionTarget, ConvertType};
pub use impute::{Impute, ImputeStrategy};
pub use normalize::{Normalize, NormalizeMethod};
pub use outliers::{FlagOutliers, OUTLIER_COLUMN_SUFFIX};
pub use rows::{DropDuplicates, DropMissing};

/// Outcome of a step that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEffect {
    /// The step produced a new dataset and a human-readable summary.
    Applied { dataset: DataSet, message: String },
    /// The step intentionally did nothing (missing column, unrecognized option, ...).
    ///
    /// Skipped steps leave no report entry; `reason` is only logged.
    Skipped { reason: String },
}

impl StepEffect {
    pub(crate) fn applied(dataset: DataSet, message: impl Into<String>) -> Self {
        Self::Applied {
            dataset,
            message: message.into(),
        }
    }

    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// Result of running one step.
pub type StepResult = Result<StepEffect, StepError>;

/// A cleaning operation over a [`DataSet`].
pub trait Transform: fmt::Debug + Send + Sync {
    /// Apply the operation to `dataset`, returning the evolved dataset or a skip/failure.
    fn apply(&self, dataset: &DataSet) -> StepResult;
}

/// A [`Transform`] that can be built from the `params` object of a plan step.
pub trait Action: Transform + Sized + 'static {
    /// Action tag used in plans.
    const NAME: &'static str;

    /// Decode the step parameters. A missing `params` key arrives as an empty object.
    fn from_params(params: &serde_json::Value) -> Result<Self, StepError>;
}

/// Decode `params` into `P` with serde, mapping failures to [`StepError::InvalidParams`].
pub(crate) fn decode_params<P: DeserializeOwned>(
    action: &str,
    params: &serde_json::Value,
) -> Result<P, StepError> {
    serde_json::from_value(params.clone()).map_err(|e| StepError::InvalidParams {
        action: action.to_string(),
        message: e.to_string(),
    })
}

/// A column list that may be written as a single name or as an array of names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ColumnList {
    One(String),
    Many(Vec<String>),
}

impl ColumnList {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(c) => vec![c],
            Self::Many(cs) => cs,
        }
    }
}

/// Resolve `column` to its index, or `None` if the dataset has no such column.
pub(crate) fn find_column(dataset: &DataSet, column: Option<&str>) -> Option<usize> {
    column.and_then(|c| dataset.schema.index_of(c))
}
