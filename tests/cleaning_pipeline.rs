use std::sync::Arc;

use chrono::NaiveDate;
use rust_data_cleaning::cleaning::{apply_plan, Plan};
use rust_data_cleaning::execution::{CleaningExecutor, EventLog, ExecutionEvent};
use rust_data_cleaning::ingestion::{load_from_path, IngestionOptions};
use rust_data_cleaning::types::{DataSet, DataType, Field, Schema, Value};

fn single_column(name: &str, data_type: DataType, values: Vec<Value>) -> DataSet {
    DataSet::new(
        Schema::new(vec![Field::new(name, data_type)]),
        values.into_iter().map(|v| vec![v]).collect(),
    )
}

fn floats(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::Float64).collect()
}

fn plan(json: &str) -> Plan {
    Plan::from_json_str(json).unwrap()
}

#[test]
fn mean_imputation_fills_and_reports_the_fill_value() {
    let ds = single_column(
        "x",
        DataType::Float64,
        vec![Value::Float64(1.0), Value::Null, Value::Float64(3.0)],
    );
    let out = apply_plan(
        &ds,
        &plan(r#"[{"action": "impute", "params": {"column": "x", "strategy": "mean"}}]"#),
    );

    assert_eq!(out.dataset.rows[1][0], Value::Float64(2.0));
    assert_eq!(
        out.report.messages(),
        vec!["Imputed 1 missing values in x with mean (2)"]
    );
}

#[test]
fn minmax_maps_range_onto_unit_interval() {
    let ds = single_column("x", DataType::Float64, floats(&[1.0, 2.0, 3.0]));
    let out = apply_plan(
        &ds,
        &plan(r#"[{"action": "normalize", "params": {"column": "x", "method": "minmax"}}]"#),
    );

    assert_eq!(out.dataset.rows, vec![floats(&[0.0]), floats(&[0.5]), floats(&[1.0])]);
    assert_eq!(out.report.messages(), vec!["Normalized x using minmax"]);
}

#[test]
fn outlier_flag_marks_only_the_extreme_value() {
    let ds = single_column("x", DataType::Float64, floats(&[1.0, 2.0, 3.0, 4.0, 100.0]));
    let out = apply_plan(
        &ds,
        &plan(r#"[{"action": "flag_outliers", "params": {"column": "x"}}]"#),
    );

    assert_eq!(out.dataset.schema.field_names().collect::<Vec<_>>(), vec!["x", "x_is_outlier"]);
    let flags: Vec<&Value> = out.dataset.column_values(1).collect();
    assert_eq!(
        flags,
        vec![
            &Value::Bool(false),
            &Value::Bool(false),
            &Value::Bool(false),
            &Value::Bool(false),
            &Value::Bool(true),
        ]
    );
}

#[test]
fn unknown_action_leaves_no_trace() {
    let ds = single_column("x", DataType::Int64, vec![Value::Int64(1), Value::Int64(1)]);
    let out = apply_plan(
        &ds,
        &plan(r#"[{"action": "explode"}, {"reasoning": "no action tag"}]"#),
    );

    assert_eq!(out.dataset, ds);
    assert!(out.report.is_empty());
}

#[test]
fn failing_step_is_reported_and_does_not_touch_the_data() {
    let ds = DataSet::new(
        Schema::new(vec![
            Field::new("a", DataType::Int64),
            Field::new("b", DataType::Utf8),
        ]),
        vec![
            vec![Value::Int64(1), Value::Null],
            vec![Value::Int64(1), Value::Null],
        ],
    );
    let out = apply_plan(
        &ds,
        &plan(
            r#"[
                {"action": "drop_missing", "params": {"columns": ["z"]}},
                {"action": "drop_duplicates"}
            ]"#,
        ),
    );

    assert_eq!(
        out.report.messages(),
        vec![
            r#"Error in step {"action":"drop_missing","params":{"columns":["z"]}}: column 'z' not found"#
                .to_string(),
            "Dropped 1 duplicate rows".to_string(),
        ]
    );
    assert_eq!(out.report.failures().count(), 1);
    assert_eq!(out.dataset.row_count(), 1);
    assert_eq!(out.dataset.rows[0][1], Value::Null);
}

#[test]
fn malformed_params_fail_at_their_position() {
    let ds = single_column("x", DataType::Int64, vec![Value::Int64(1)]);
    let out = apply_plan(
        &ds,
        &plan(
            r#"[
                {"action": "drop_duplicates"},
                {"action": "impute", "params": {"column": 5}}
            ]"#,
        ),
    );

    let entries = out.report.entries();
    assert_eq!(entries.len(), 2);
    assert!(!entries[0].is_failure());
    assert!(entries[1].is_failure());
    assert_eq!(entries[1].step, 1);
    assert!(out.report.messages()[1].starts_with("Error in step "));
    assert_eq!(out.dataset, ds);
}

#[test]
fn skipped_steps_are_observed_but_not_reported() {
    let ds = single_column("x", DataType::Utf8, vec![Value::Utf8("a".into())]);
    let log = Arc::new(EventLog::new());
    let executor = CleaningExecutor::new().with_observer(log.clone());
    let out = executor.apply(
        &ds,
        &plan(
            r#"[
                {"action": "normalize", "params": {"column": "x"}},
                {"action": "convert_type", "params": {"column": "x", "type": "complex"}},
                {"action": "impute", "params": {"column": "missing", "strategy": "mean"}}
            ]"#,
        ),
    );

    assert!(out.report.is_empty());
    assert_eq!(out.dataset, ds);

    let skipped = log
        .events()
        .iter()
        .filter(|e| matches!(e, ExecutionEvent::StepSkipped { .. }))
        .count();
    assert_eq!(skipped, 3);

    let metrics = executor.metrics().snapshot();
    assert_eq!(metrics.steps_total, 3);
    assert_eq!(metrics.steps_skipped, 3);
    assert_eq!(metrics.steps_applied, 0);
}

#[test]
fn orders_plan_from_file_cleans_the_orders_fixture() {
    let ds = load_from_path("tests/fixtures/orders.csv", &IngestionOptions::default()).unwrap();
    assert_eq!(ds.row_count(), 7);

    let plan = Plan::from_source("tests/fixtures/orders_plan.json").unwrap();
    let executor = CleaningExecutor::new();
    let out = executor.apply(&ds, &plan);

    assert_eq!(
        out.report.messages(),
        vec![
            "Dropped 1 duplicate rows".to_string(),
            "Imputed 1 missing values in amount with median (13)".to_string(),
            r#"Dropped 1 rows with missing values in ["customer"]"#.to_string(),
            "Flagged outliers in amount".to_string(),
            "Converted placed_at to datetime".to_string(),
            r#"Dropped columns: ["region"]"#.to_string(),
        ]
    );

    let cleaned = &out.dataset;
    assert_eq!(
        cleaned.schema.field_names().collect::<Vec<_>>(),
        vec!["order_id", "customer", "amount", "placed_at", "amount_is_outlier"]
    );
    assert_eq!(cleaned.row_count(), 5);

    let amount = cleaned.schema.index_of("amount").unwrap();
    assert_eq!(cleaned.rows[1][amount], Value::Float64(13.0));

    let flag = cleaned.schema.index_of("amount_is_outlier").unwrap();
    let flagged: Vec<&Value> = cleaned
        .rows
        .iter()
        .filter(|r| r[flag] == Value::Bool(true))
        .map(|r| &r[0])
        .collect();
    assert_eq!(flagged, vec![&Value::Int64(5)]);

    let placed = cleaned.schema.index_of("placed_at").unwrap();
    assert_eq!(cleaned.schema.fields[placed].data_type, DataType::Timestamp);
    let jan_2 = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    assert_eq!(cleaned.rows[0][placed], Value::Timestamp(jan_2));
    assert_eq!(cleaned.rows[3][placed], Value::Null);

    let metrics = executor.metrics().snapshot();
    assert_eq!(metrics.steps_applied, 6);
    assert_eq!(metrics.rows_removed, 2);

    // The input is never modified.
    assert_eq!(ds.row_count(), 7);
}

#[test]
fn inline_and_file_plans_are_equivalent() {
    let text = std::fs::read_to_string("tests/fixtures/orders_plan.json").unwrap();
    let from_file = Plan::from_source("tests/fixtures/orders_plan.json").unwrap();
    let inline = Plan::from_source(&text).unwrap();
    assert_eq!(from_file.len(), inline.len());

    let ds = load_from_path("tests/fixtures/orders.csv", &IngestionOptions::default()).unwrap();
    assert_eq!(apply_plan(&ds, &from_file), apply_plan(&ds, &inline));
}

#[test]
fn nan_counts_as_missing_everywhere() {
    let ds = single_column(
        "x",
        DataType::Float64,
        vec![
            Value::Float64(1.0),
            Value::Float64(f64::NAN),
            Value::Null,
            Value::Float64(3.0),
        ],
    );

    let profiled = rust_data_cleaning::profiling::profile(&ds);
    let column = profiled.column("x").unwrap();
    assert_eq!(column.missing, 2);
    assert_eq!(column.numeric.as_ref().unwrap().mean, 2.0);

    let imputed = apply_plan(
        &ds,
        &plan(r#"[{"action": "impute", "params": {"column": "x", "strategy": "mean"}}]"#),
    );
    assert_eq!(
        imputed.report.messages(),
        vec!["Imputed 2 missing values in x with mean (2)"]
    );
    let filled: Vec<Value> = imputed.dataset.column_values(0).cloned().collect();
    assert_eq!(filled, floats(&[1.0, 2.0, 2.0, 3.0]));

    let dropped = apply_plan(&ds, &plan(r#"[{"action": "drop_missing"}]"#));
    assert_eq!(dropped.dataset.row_count(), 2);
    assert_eq!(
        dropped.report.messages(),
        vec!["Dropped 2 rows with missing values in [\"x\"]"]
    );
}
