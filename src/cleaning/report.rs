//! The cleaning report: one entry per applied or failed step.
//!
//! Skipped and ignored steps leave no entry.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::StepError;

/// What happened to a step that left a trace in the report.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step changed the dataset.
    Applied { message: String },
    /// The step raised a fault; the dataset was left as it was before the step.
    Failed { error: StepError },
}

/// One report line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    /// Step position in the plan.
    pub step: usize,
    /// The step object as compact JSON.
    pub raw: String,
    /// Action tag, if the step had one.
    pub action: Option<String>,
    pub outcome: StepOutcome,
}

impl ReportEntry {
    /// `true` when the step raised a fault.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Applied { message } => f.write_str(message),
            StepOutcome::Failed { error } => write!(f, "Error in step {}: {error}", self.raw),
        }
    }
}

/// Append-only log of executed steps, in execution order.
///
/// Serializes as a list of the entries' display strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Entries in execution order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Human-readable lines.
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Entries of steps that failed.
    ///
    /// ```rust
    /// use rust_data_cleaning::cleaning::{apply_plan, Plan};
    /// use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};
    ///
    /// let ds = DataSet::new(
    ///     Schema::new(vec![Field::new("x", DataType::Int64)]),
    ///     vec![vec![Value::Int64(1)]],
    /// );
    /// let plan = Plan::from_json_str(
    ///     r#"[{"action": "drop_missing", "params": {"columns": ["y"]}}, {"action": "drop_duplicates"}]"#,
    /// )?;
    /// let report = apply_plan(&ds, &plan).report;
    /// assert_eq!(report.len(), 2);
    /// assert_eq!(report.failures().count(), 1);
    /// # Ok::<(), rust_data_cleaning::PlanError>(())
    /// ```
    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.is_failure())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(ToString::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_lines_embed_raw_step() {
        let mut report = Report::new();
        report.push(ReportEntry {
            step: 0,
            raw: r#"{"action":"drop_duplicates"}"#.into(),
            action: Some("drop_duplicates".into()),
            outcome: StepOutcome::Applied {
                message: "Dropped 0 duplicate rows".into(),
            },
        });
        report.push(ReportEntry {
            step: 1,
            raw: r#"{"action":"drop_missing","params":{"columns":["z"]}}"#.into(),
            action: Some("drop_missing".into()),
            outcome: StepOutcome::Failed {
                error: StepError::ColumnNotFound { column: "z".into() },
            },
        });

        assert_eq!(
            report.messages(),
            vec![
                "Dropped 0 duplicate rows".to_string(),
                r#"Error in step {"action":"drop_missing","params":{"columns":["z"]}}: column 'z' not found"#
                    .to_string(),
            ]
        );
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!(report.messages())
        );
    }
}
