//! Plan parsing and the action registry.
//!
//! A plan is a JSON array of step objects:
//!
//! ```json
//! [
//!   {"action": "drop_duplicates"},
//!   {"action": "impute", "params": {"column": "age", "strategy": "median"}},
//!   {"action": "flag_outliers", "params": {"column": "income"}, "reasoning": "skewed"}
//! ]
//! ```
//!
//! Each step is resolved against an [`ActionRegistry`] when the plan is loaded. Parameter
//! errors do not reject the plan: the step is kept as [`StepKind::Invalid`] and reported as a
//! failure at its position when the plan runs.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::actions::{
    Action, ConvertType, DropColumns, DropDuplicates, DropMissing, FlagOutliers, Impute,
    Normalize, Transform,
};
use crate::error::{PlanError, PlanResult, StepError};

type Parser =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Transform>, StepError> + Send + Sync>;

/// Maps action tags to parameter parsers.
///
/// [`ActionRegistry::builtin`] knows the seven built-in actions. Additional actions can be
/// registered without touching the executor.
pub struct ActionRegistry {
    parsers: HashMap<String, Parser>,
}

impl ActionRegistry {
    /// A registry with no actions.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// A registry holding every built-in action.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_action::<DropDuplicates>();
        registry.register_action::<DropMissing>();
        registry.register_action::<Impute>();
        registry.register_action::<DropColumns>();
        registry.register_action::<Normalize>();
        registry.register_action::<ConvertType>();
        registry.register_action::<FlagOutliers>();
        registry
    }

    /// Register `A` under [`Action::NAME`], replacing any previous entry.
    pub fn register_action<A: Action>(&mut self) -> &mut Self {
        self.register(A::NAME, |params| {
            A::from_params(params).map(|a| Box::new(a) as Box<dyn Transform>)
        })
    }

    /// Register a custom parser under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, parser: F) -> &mut Self
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Transform>, StepError> + Send + Sync + 'static,
    {
        self.parsers.insert(name.into(), Box::new(parser));
        self
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn resolve(&self, action: Option<&str>, params: &serde_json::Value) -> StepKind {
        let Some(parser) = action.and_then(|a| self.parsers.get(a)) else {
            return StepKind::Unrecognized;
        };
        match parser(params) {
            Ok(transform) => StepKind::Ready(transform),
            Err(e) => StepKind::Invalid(e),
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

/// How a step resolved at load time.
#[derive(Debug)]
pub enum StepKind {
    /// Parameters decoded; ready to run.
    Ready(Box<dyn Transform>),
    /// Known action whose parameters failed to decode. Runs as a failure.
    Invalid(StepError),
    /// Unknown or missing action tag. Ignored at run time.
    Unrecognized,
}

/// One step of a [`Plan`].
#[derive(Debug)]
pub struct PlanStep {
    /// Position in the plan, starting at 0.
    pub index: usize,
    /// Action tag as written, if it was a string.
    pub action: Option<String>,
    /// The step object as written, used in failure messages.
    pub raw: serde_json::Value,
    /// Resolved form.
    pub kind: StepKind,
}

impl PlanStep {
    /// The step object rendered as compact JSON.
    pub fn raw_json(&self) -> String {
        self.raw.to_string()
    }
}

/// An ordered list of resolved cleaning steps.
#[derive(Debug, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    /// Parse a JSON plan using the built-in actions.
    pub fn from_json_str(text: &str) -> PlanResult<Self> {
        Self::from_json_str_with(text, &ActionRegistry::builtin())
    }

    /// Parse a JSON plan, resolving actions through `registry`.
    pub fn from_json_str_with(text: &str, registry: &ActionRegistry) -> PlanResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value_with(value, registry)
    }

    /// Resolve an already parsed JSON plan.
    pub fn from_value_with(value: serde_json::Value, registry: &ActionRegistry) -> PlanResult<Self> {
        let serde_json::Value::Array(items) = value else {
            return Err(PlanError::Shape {
                message: format!("expected an array of steps, got {}", json_kind(&value)),
            });
        };

        let mut steps = Vec::with_capacity(items.len());
        for (index, raw) in items.into_iter().enumerate() {
            let serde_json::Value::Object(obj) = &raw else {
                return Err(PlanError::Shape {
                    message: format!("step {index} is {}, expected an object", json_kind(&raw)),
                });
            };
            let action = obj
                .get("action")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            let params = match obj.get("params") {
                None | Some(serde_json::Value::Null) => {
                    serde_json::Value::Object(serde_json::Map::new())
                }
                Some(p) => p.clone(),
            };
            let kind = registry.resolve(action.as_deref(), &params);
            steps.push(PlanStep {
                index,
                action,
                raw,
                kind,
            });
        }
        Ok(Self { steps })
    }

    /// Load a plan from `source`: the contents of the file it names if that file exists,
    /// otherwise `source` itself parsed as inline JSON.
    pub fn from_source(source: &str) -> PlanResult<Self> {
        Self::from_source_with(source, &ActionRegistry::builtin())
    }

    /// [`Plan::from_source`] with a custom registry.
    pub fn from_source_with(source: &str, registry: &ActionRegistry) -> PlanResult<Self> {
        let path = Path::new(source);
        if path.is_file() {
            let text = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_json_str_with(&text, registry)
        } else {
            Self::from_json_str_with(source, registry)
        }
    }

    /// Build a plan from transforms directly, bypassing JSON.
    pub fn from_transforms(transforms: Vec<(String, Box<dyn Transform>)>) -> Self {
        let steps = transforms
            .into_iter()
            .enumerate()
            .map(|(index, (action, transform))| PlanStep {
                index,
                raw: serde_json::json!({ "action": action }),
                action: Some(action),
                kind: StepKind::Ready(transform),
            })
            .collect();
        Self { steps }
    }

    /// Steps in plan order, including ignored ones.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of steps, including ignored ones.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::actions::{StepEffect, StepResult};
    use crate::types::DataSet;

    #[test]
    fn resolves_known_steps_and_ignores_extra_keys() {
        let plan = Plan::from_json_str(
            r#"[
                {"action": "drop_duplicates", "reasoning": "dupes"},
                {"action": "impute", "params": {"column": "a"}},
                {"action": "drop_columns", "params": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.steps().iter().all(|s| matches!(s.kind, StepKind::Ready(_))));
        assert_eq!(plan.steps()[1].action.as_deref(), Some("impute"));
    }

    #[test]
    fn unknown_and_missing_actions_are_unrecognized() {
        let plan = Plan::from_json_str(r#"[{"action": "teleport"}, {"params": {}}, {"action": 7}]"#)
            .unwrap();
        assert!(plan
            .steps()
            .iter()
            .all(|s| matches!(s.kind, StepKind::Unrecognized)));
    }

    #[test]
    fn bad_params_become_invalid_steps() {
        let plan =
            Plan::from_json_str(r#"[{"action": "impute", "params": {"column": 5}}]"#).unwrap();
        assert!(matches!(
            plan.steps()[0].kind,
            StepKind::Invalid(StepError::InvalidParams { .. })
        ));
    }

    #[test]
    fn rejects_non_array_and_non_object_steps() {
        assert!(matches!(
            Plan::from_json_str(r#"{"action": "drop_duplicates"}"#),
            Err(PlanError::Shape { .. })
        ));
        assert!(matches!(
            Plan::from_json_str(r#"["drop_duplicates"]"#),
            Err(PlanError::Shape { .. })
        ));
        assert!(matches!(Plan::from_json_str("[{"), Err(PlanError::Json(_))));
    }

    #[test]
    fn from_source_falls_back_to_inline_json() {
        let plan = Plan::from_source(r#"[{"action": "drop_duplicates"}]"#).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[derive(Debug)]
    struct Noop;

    impl Transform for Noop {
        fn apply(&self, _dataset: &DataSet) -> StepResult {
            Ok(StepEffect::skipped("noop"))
        }
    }

    #[test]
    fn custom_actions_can_be_registered() {
        let mut registry = ActionRegistry::builtin();
        registry.register("noop", |_| Ok(Box::new(Noop) as Box<dyn Transform>));
        assert!(registry.contains("noop"));
        assert_eq!(registry.names().len(), 8);

        let plan = Plan::from_json_str_with(r#"[{"action": "noop"}]"#, &registry).unwrap();
        assert!(matches!(plan.steps()[0].kind, StepKind::Ready(_)));
    }
}
