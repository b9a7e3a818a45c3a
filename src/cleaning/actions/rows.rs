//! Row-removing actions: `drop_duplicates` and `drop_missing`.

use serde::Deserialize;

use super::{decode_params, Action, ColumnList, StepEffect, StepResult, Transform};
use crate::error::StepError;
use crate::stats::duplicate_mask;
use crate::types::DataSet;

/// Remove rows that repeat an earlier row across all columns, keeping the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropDuplicates;

impl Transform for DropDuplicates {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let mask = duplicate_mask(dataset);
        let mut dup = mask.iter();
        let out = dataset.filter_rows(|_| !dup.next().copied().unwrap_or(false));
        let removed = dataset.row_count() - out.row_count();
        Ok(StepEffect::applied(
            out,
            format!("Dropped {removed} duplicate rows"),
        ))
    }
}

impl Action for DropDuplicates {
    const NAME: &'static str = "drop_duplicates";

    fn from_params(_params: &serde_json::Value) -> Result<Self, StepError> {
        Ok(Self)
    }
}

/// Remove rows holding a missing value (null or NaN) in any of the target columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropMissing {
    /// Target columns; `None` means every column.
    pub columns: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct DropMissingParams {
    #[serde(default)]
    columns: Option<ColumnList>,
}

impl DropMissing {
    /// Check every column.
    pub fn all() -> Self {
        Self { columns: None }
    }

    /// Check only `columns`.
    pub fn columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }
}

impl Transform for DropMissing {
    fn apply(&self, dataset: &DataSet) -> StepResult {
        let names: Vec<String> = match &self.columns {
            Some(cols) => cols.clone(),
            None => dataset.schema.field_names().map(str::to_string).collect(),
        };

        let mut idxs = Vec::with_capacity(names.len());
        for name in &names {
            let idx = dataset
                .schema
                .index_of(name)
                .ok_or_else(|| StepError::ColumnNotFound {
                    column: name.clone(),
                })?;
            idxs.push(idx);
        }

        let out = dataset.filter_rows(|row| idxs.iter().all(|&i| !row[i].is_missing()));
        let removed = dataset.row_count() - out.row_count();
        Ok(StepEffect::applied(
            out,
            format!("Dropped {removed} rows with missing values in {names:?}"),
        ))
    }
}

impl Action for DropMissing {
    const NAME: &'static str = "drop_missing";

    fn from_params(params: &serde_json::Value) -> Result<Self, StepError> {
        let p: DropMissingParams = decode_params(Self::NAME, params)?;
        Ok(Self {
            columns: p.columns.map(ColumnList::into_vec),
        })
    }
}
