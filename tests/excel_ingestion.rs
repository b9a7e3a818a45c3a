#![cfg(feature = "excel")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_data_cleaning::export::save_to_path;
use rust_data_cleaning::ingestion::excel::{
    ingest_excel_from_path, ingest_excel_workbook_from_path, load_excel_from_path, load_excel_workbook_from_path,
};
use rust_data_cleaning::types::{parse_timestamp, DataSet, DataType, Field, Schema, Value};
use rust_xlsxwriter::Workbook;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-data-cleaning-{name}-{nanos}.xlsx"))
}

fn people_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("name", DataType::Utf8),
        Field::new("score", DataType::Float64),
        Field::new("active", DataType::Bool),
    ])
}

fn write_sheet(ws: &mut rust_xlsxwriter::Worksheet, rows: &[(f64, &str, f64, bool)]) {
    for (c, h) in ["id", "name", "score", "active"].iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, (id, name, score, active)) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        ws.write_number(r, 0, *id).unwrap();
        ws.write_string(r, 1, *name).unwrap();
        ws.write_number(r, 2, *score).unwrap();
        ws.write_boolean(r, 3, *active).unwrap();
    }
}

fn write_people_multi_sheet_xlsx(path: &PathBuf) {
    let mut wb = Workbook::new();

    let ws1 = wb.add_worksheet();
    ws1.set_name("Sheet1").unwrap();
    write_sheet(ws1, &[(1.0, "Ada", 98.5, true), (2.0, "Grace", 87.25, false)]);

    let ws2 = wb.add_worksheet();
    ws2.set_name("Second").unwrap();
    write_sheet(ws2, &[(3.0, "Linus", 77.0, true)]);

    wb.save(path).unwrap();
}

#[test]
fn ingest_excel_reads_first_sheet_by_default() {
    let path = tmp_file("people");
    write_people_multi_sheet_xlsx(&path);

    let ds = ingest_excel_from_path(&path, None, &people_schema()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::Int64(1));
    assert_eq!(ds.rows[1][3], Value::Bool(false));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_multi_tab_all_sheets_concatenates_rows() {
    let path = tmp_file("multi");
    write_people_multi_sheet_xlsx(&path);

    let ds = ingest_excel_workbook_from_path(&path, None, &people_schema()).unwrap();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.rows[2][1], Value::Utf8("Linus".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_excel_detects_cell_types() {
    let path = tmp_file("detect");
    write_people_multi_sheet_xlsx(&path);

    let ds = load_excel_from_path(&path, None).unwrap();
    assert_eq!(ds.schema, people_schema());

    let second = load_excel_workbook_from_path(&path, Some(&["Second"])).unwrap();
    assert_eq!(second.row_count(), 1);
    assert_eq!(second.rows[0][2], Value::Float64(77.0));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn xlsx_export_reloads_with_the_same_values() {
    let ds = DataSet::new(
        Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("when", DataType::Timestamp),
            Field::new("note", DataType::Utf8),
        ]),
        vec![
            vec![
                Value::Int64(1),
                Value::Timestamp(parse_timestamp("2024-03-01 08:30:00").unwrap()),
                Value::Utf8("first".into()),
            ],
            vec![Value::Int64(2), Value::Null, Value::Utf8("second".into())],
        ],
    );
    let path = tmp_file("export");
    let written = save_to_path(&ds, &path).unwrap();
    assert_eq!(written, path);

    let reloaded = load_excel_from_path(&path, None).unwrap();
    assert_eq!(reloaded, ds);
    let _ = std::fs::remove_file(&path);
}
