use rust_data_cleaning::ingestion::{load_from_path, IngestionOptions};
use rust_data_cleaning::profiling::{profile, profile_with_options, ProfileOptions};
use rust_data_cleaning::types::{DataSet, DataType, Field, Schema};

fn orders() -> DataSet {
    load_from_path("tests/fixtures/orders.csv", &IngestionOptions::default()).unwrap()
}

#[test]
fn profiles_the_orders_fixture() {
    let p = profile(&orders());

    assert_eq!(p.rows, 7);
    assert_eq!(p.columns, 5);
    assert_eq!(p.duplicates, 1);
    assert!(p.memory_usage > 0);
    assert_eq!(p.head.len(), 7);

    let amount = p.column("amount").unwrap();
    assert_eq!(amount.data_type, "float64");
    assert_eq!(amount.missing, 1);
    assert!((amount.missing_pct - 100.0 / 7.0).abs() < 1e-9);
    let summary = amount.numeric.as_ref().unwrap();
    assert_eq!(summary.min, 11.0);
    assert_eq!(summary.max, 950.0);
    assert_eq!(summary.outliers, 1);

    let customer = p.column("customer").unwrap();
    assert_eq!(customer.data_type, "utf8");
    assert_eq!(customer.missing, 1);
    assert_eq!(customer.unique, 5);
    assert!(customer.numeric.is_none());
    assert_eq!(customer.sample.len(), 5);
}

#[test]
fn profile_json_shape() {
    let json = serde_json::to_value(profile(&orders())).unwrap();

    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["rows", "columns", "duplicates", "memory_usage", "column_stats", "head"]
    );

    let stats = json["column_stats"].as_object().unwrap();
    let names: Vec<&str> = stats.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["order_id", "customer", "amount", "placed_at", "region"]);

    let amount = &stats["amount"];
    assert_eq!(amount["type"], "float64");
    for key in ["missing", "missing_pct", "unique", "sample", "mean", "std", "min", "max", "outliers"] {
        assert!(amount.get(key).is_some(), "amount is missing '{key}'");
    }
    assert!(stats["customer"].get("mean").is_none());

    assert_eq!(json["head"][0]["customer"], "ada");
    assert_eq!(json["head"][1]["amount"], serde_json::Value::Null);
}

#[test]
fn zero_row_dataset_profiles_cleanly() {
    let ds = DataSet::new(
        Schema::new(vec![
            Field::new("x", DataType::Float64),
            Field::new("y", DataType::Utf8),
        ]),
        Vec::new(),
    );
    let p = profile(&ds);

    assert_eq!(p.rows, 0);
    assert_eq!(p.duplicates, 0);
    assert!(p.head.is_empty());
    for column in &p.column_stats {
        assert_eq!(column.missing, 0);
        assert_eq!(column.missing_pct, 0.0);
        assert!(column.numeric.is_none());
    }
    assert!(serde_json::to_string(&p).is_ok());
}

#[test]
fn options_bound_preview_and_samples() {
    let p = profile_with_options(
        &orders(),
        &ProfileOptions {
            preview_rows: 2,
            sample_values: 1,
        },
    );
    assert_eq!(p.head.len(), 2);
    assert!(p.column_stats.iter().all(|c| c.sample.len() <= 1));
}
