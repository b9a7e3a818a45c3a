use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

use rust_data_cleaning::IngestionError;
use rust_data_cleaning::ingestion::{
    ingest_from_path, load_from_path, IngestionFormat, IngestionOptions, IngestionRequest,
};
use rust_data_cleaning::types::{DataType, Field, Schema, Value};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-data-cleaning-unified-{nanos}.{ext}"))
}

fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

fn write_people_parquet(path: &PathBuf) {
    let schema_str = r#"
    message schema {
      REQUIRED INT64 id;
      REQUIRED BINARY name (UTF8);
      REQUIRED DOUBLE score;
      REQUIRED BOOLEAN active;
    }
    "#;

    let schema = Arc::new(parse_message_type(schema_str).unwrap());
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();

    let mut rg = writer.next_row_group().unwrap();
    while let Some(mut col) = rg.next_column().unwrap() {
        match col.untyped() {
            ColumnWriter::Int64ColumnWriter(w) => {
                w.write_batch(&[1_i64, 2_i64], None, None).unwrap();
            }
            ColumnWriter::ByteArrayColumnWriter(w) => {
                w.write_batch(&[ByteArray::from("Ada"), ByteArray::from("Grace")], None, None)
                    .unwrap();
            }
            ColumnWriter::DoubleColumnWriter(w) => {
                w.write_batch(&[98.5_f64, 87.25_f64], None, None).unwrap();
            }
            ColumnWriter::BoolColumnWriter(w) => {
                w.write_batch(&[true, false], None, None).unwrap();
            }
            _ => panic!("unexpected column writer in test"),
        }
        col.close().unwrap();
    }
    rg.close().unwrap();
    writer.close().unwrap();
}

#[test]
fn load_csv_auto_by_extension() {
    let ds = load_from_path("tests/fixtures/people.csv", &IngestionOptions::default()).unwrap();
    assert_eq!(ds.schema, people_schema());
    assert_eq!(ds.row_count(), 2);
}

#[test]
fn load_parquet_takes_types_from_the_file() {
    let path = tmp_file("parquet");
    write_people_parquet(&path);

    let ds = load_from_path(&path, &IngestionOptions::default()).unwrap();
    assert_eq!(ds.schema, people_schema());
    assert_eq!(ds.rows[1][1], Value::Utf8("Grace".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_switches_formats_with_the_same_schema() {
    let schema = people_schema();
    let ds_csv = ingest_from_path("tests/fixtures/people.csv", &schema, &IngestionOptions::default()).unwrap();

    let path = tmp_file("parquet");
    write_people_parquet(&path);
    let ds_parquet = ingest_from_path(&path, &schema, &IngestionOptions::default()).unwrap();

    assert_eq!(ds_csv, ds_parquet);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_json_explicit_format_errors_with_flat_schema() {
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Json),
        ..Default::default()
    };
    let err = ingest_from_path("tests/fixtures/people.json", &people_schema(), &opts).unwrap_err();
    assert!(err.to_string().contains("missing required field 'name'"));
}

#[test]
fn explicit_format_overrides_the_extension() {
    let path = tmp_file("data");
    std::fs::copy("tests/fixtures/people.csv", &path).unwrap();

    let err = load_from_path(&path, &IngestionOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedFormat { .. }));

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        ..Default::default()
    };
    assert_eq!(load_from_path(&path, &opts).unwrap().row_count(), 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_is_not_found() {
    let err = load_from_path("tests/fixtures/nope.csv", &IngestionOptions::default()).unwrap_err();
    match err {
        IngestionError::NotFound { path } => assert!(path.ends_with("nope.csv")),
        other => panic!("unexpected {other}"),
    }
}

#[cfg(not(feature = "excel"))]
#[test]
fn workbooks_need_the_excel_feature() {
    let path = tmp_file("xlsx");
    std::fs::write(&path, b"not really a workbook").unwrap();
    let err = load_from_path(&path, &IngestionOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedFormat { .. }));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn request_detects_schema_when_none_is_given() {
    let request = IngestionRequest::new("tests/fixtures/people.csv");
    assert_eq!(request.run().unwrap().schema, people_schema());

    let flat = IngestionRequest {
        schema: Some(Schema::new(vec![Field::new("name", DataType::Utf8)])),
        ..request
    };
    let ds = flat.run().unwrap();
    assert_eq!(ds.column_count(), 1);
    assert_eq!(ds.rows[0][0], Value::Utf8("Ada".to_string()));
}
