//! `drop_columns`: remove columns by name.

use serde::Deserialize;

use super::{decode_params, Action, ColumnList, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::types::DataSet;

/// Remove the named columns. Names that do not exist are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropColumns {
    /// Requested column names, reported verbatim.
    pub columns: Vec<String>,
}

#[derive(Deserialize)]
struct DropColumnsParams {
    #[serde(default)]
    columns: Option<ColumnList>,
}

impl DropColumns {
    /// Drop `columns`, in the order they will be reported.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transform for DropColumns {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let out = dataset.select_columns(|_, f| !self.columns.contains(&f.name));
        Ok(StepEffect::applied(
            out,
            format!("Dropped columns: {:?}", self.columns),
        ))
    }
}

impl Action for DropColumns {
    const NAME: &'static str = "drop_columns";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: DropColumnsParams = decode_params(Self::NAME, params)?;
        Ok(Self {
            columns: p.columns.map(ColumnList::into_vec).unwrap_or_default(),
        })
    }
}
