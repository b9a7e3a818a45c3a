//! JSON framing of results printed by the command-line tool.
//!
//! Cleaning runs print `{"status": "success", "report": [...]}` or
//! `{"status": "error", "error": "..."}`. Profiling and planning runs print the profile or
//! the suggested steps themselves, or `{"error": "..."}`.

use std::fmt::Display;

use serde::Serialize;

use crate::cleaning::Report;
use crate::planning::SuggestedPlan;
use crate::profiling::DatasetProfile;

/// Outcome of a cleaning invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CleanEnvelope {
    /// Loading, cleaning and saving all succeeded. Individual steps may still have failed.
    Success { report: Report },
    /// An adapter fault ended the invocation.
    Error { error: String },
}

impl CleanEnvelope {
    pub fn from_result<E: Display>(result: Result<Report, E>) -> Self {
        match result {
            Ok(report) => Self::Success { report },
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome of a profiling invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileEnvelope {
    Profile(DatasetProfile),
    Error { error: String },
}

impl ProfileEnvelope {
    pub fn from_result<E: Display>(result: Result<DatasetProfile, E>) -> Self {
        match result {
            Ok(profile) => Self::Profile(profile),
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Profile(_))
    }
}

/// Outcome of a plan suggestion invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanEnvelope {
    Plan(SuggestedPlan),
    Error { error: String },
}

impl PlanEnvelope {
    pub fn from_result<E: Display>(result: Result<SuggestedPlan, E>) -> Self {
        match result {
            Ok(plan) => Self::Plan(plan),
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Plan(_))
    }
}

/// Render an envelope, indented when `pretty` is set.
pub fn render<T: Serialize>(envelope: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(envelope)
    } else {
        serde_json::to_string(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::apply_plan;
    use crate::cleaning::Plan;
    use crate::planning::suggest_plan;
    use crate::profiling::profile;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn small() -> DataSet {
        DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Int64)]),
            vec![vec![Value::Int64(1)], vec![Value::Int64(1)]],
        )
    }

    #[test]
    fn clean_success_lists_report_lines() {
        let plan = Plan::from_json_str(r#"[{"action": "drop_duplicates"}]"#).unwrap();
        let outcome = apply_plan(&small(), &plan);
        let env = CleanEnvelope::from_result(Ok::<_, String>(outcome.report));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            serde_json::json!({"status": "success", "report": ["Dropped 1 duplicate rows"]})
        );
    }

    #[test]
    fn clean_error_carries_message() {
        let env = CleanEnvelope::from_result(Err::<Report, _>("file not found: in.csv"));
        assert!(!env.is_success());
        assert_eq!(
            render(&env, false).unwrap(),
            r#"{"status":"error","error":"file not found: in.csv"}"#
        );
    }

    #[test]
    fn profile_envelope_is_the_profile_itself() {
        let env = ProfileEnvelope::from_result(Ok::<_, String>(profile(&small())));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["rows"], 2);
        assert_eq!(json["duplicates"], 1);
        assert!(json.get("status").is_none());

        let err = ProfileEnvelope::from_result(Err::<DatasetProfile, _>("boom"));
        assert_eq!(serde_json::to_value(&err).unwrap(), serde_json::json!({"error": "boom"}));
    }

    #[test]
    fn plan_envelope_is_a_bare_array() {
        let env = PlanEnvelope::from_result(Ok::<_, String>(suggest_plan(&profile(&small()))));
        assert!(env.is_success());
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            serde_json::json!([{
                "action": "drop_duplicates",
                "params": {},
                "reasoning": "Found 1 duplicate rows."
            }])
        );

        let err = PlanEnvelope::from_result(Err::<SuggestedPlan, _>("no such file"));
        assert!(!err.is_success());
        assert_eq!(render(&err, false).unwrap(), r#"{"error":"no such file"}"#);
    }
}
