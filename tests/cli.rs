use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rust-data-cleaning"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-data-cleaning-cli-{name}-{nanos}.{ext}"))
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not json ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn clean_with_plan_file_prints_success_envelope() {
    let out_path = tmp_file("orders", "csv");
    let output = bin()
        .arg("clean")
        .arg("tests/fixtures/orders.csv")
        .arg(&out_path)
        .arg("tests/fixtures/orders_plan.json")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "success");
    assert_eq!(json["report"].as_array().unwrap().len(), 6);
    assert_eq!(json["report"][0], "Dropped 1 duplicate rows");

    let written = std::fs::read_to_string(&out_path).unwrap();
    let _ = std::fs::remove_file(&out_path);
    assert!(written.starts_with("order_id,customer,amount,placed_at,amount_is_outlier\n"));
    assert_eq!(written.lines().count(), 6);
}

#[test]
fn clean_with_inline_plan_and_unknown_extension() {
    let out_path = tmp_file("inline", "out");
    let output = bin()
        .args(["clean", "tests/fixtures/people.csv"])
        .arg(&out_path)
        .arg(r#"[{"action": "drop_columns", "params": {"columns": ["active"]}}]"#)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({"status": "success", "report": ["Dropped columns: [\"active\"]"]})
    );

    let mut written = out_path.into_os_string();
    written.push(".csv");
    let written = PathBuf::from(written);
    assert!(written.exists());
    let _ = std::fs::remove_file(&written);
}

#[test]
fn failed_steps_still_exit_zero() {
    let out_path = tmp_file("failed-step", "json");
    let output = bin()
        .args(["clean", "tests/fixtures/people.csv"])
        .arg(&out_path)
        .arg(r#"[{"action": "drop_missing", "params": {"columns": ["nope"]}}]"#)
        .output()
        .unwrap();
    let _ = std::fs::remove_file(&out_path);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "success");
    let line = json["report"][0].as_str().unwrap();
    assert!(line.starts_with("Error in step "), "{line}");
    assert!(line.ends_with("column 'nope' not found"), "{line}");
}

#[test]
fn missing_input_prints_error_envelope_and_exits_one() {
    let output = bin()
        .args(["clean", "tests/fixtures/does_not_exist.csv", "out.csv", "[]"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert!(
        json["error"].as_str().unwrap().contains("file not found"),
        "{json}"
    );
}

#[test]
fn malformed_plan_is_an_error() {
    let output = bin()
        .args(["clean", "tests/fixtures/people.csv", "out.csv", "{not json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().starts_with("load cleaning plan"));
}

#[test]
fn profile_prints_the_profile() {
    let output = bin()
        .args(["profile", "tests/fixtures/orders.csv", "--pretty"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\n  \"rows\": 7"));
    let json = stdout_json(&output);
    assert_eq!(json["duplicates"], 1);
    assert_eq!(json["column_stats"]["amount"]["outliers"], 1);
}

#[test]
fn profile_of_unsupported_format_reports_error() {
    let output = bin()
        .args(["profile", "Cargo.toml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert!(json["error"].as_str().unwrap().contains("unsupported file format"));
    assert!(json.get("status").is_none());
}

#[test]
fn bad_plan_is_reported_before_the_input_is_read() {
    let output = bin()
        .args(["clean", "tests/fixtures/does_not_exist.csv", "out.csv", "{not json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert!(
        json["error"].as_str().unwrap().starts_with("load cleaning plan"),
        "{json}"
    );
}

#[test]
fn plan_prints_suggested_steps() {
    let output = bin()
        .args(["plan", "tests/fixtures/orders.csv"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    let steps = json.as_array().unwrap();
    let actions: Vec<(&str, &serde_json::Value)> = steps
        .iter()
        .map(|s| (s["action"].as_str().unwrap(), &s["params"]))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("drop_duplicates", &serde_json::json!({})),
            ("impute", &serde_json::json!({"column": "customer", "strategy": "mode"})),
            ("impute", &serde_json::json!({"column": "amount", "strategy": "mean"})),
            ("flag_outliers", &serde_json::json!({"column": "amount"})),
            ("impute", &serde_json::json!({"column": "region", "strategy": "mode"})),
        ]
    );
    assert_eq!(steps[0]["reasoning"], "Found 1 duplicate rows.");
}

#[test]
fn plan_of_missing_file_reports_error() {
    let output = bin()
        .args(["plan", "tests/fixtures/does_not_exist.csv"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert!(json["error"].as_str().unwrap().contains("file not found"), "{json}");
}
