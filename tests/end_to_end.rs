use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;
use sheet_pipeline::export::{export_to_bytes, EXPORT_SHEET_NAME};
use sheet_pipeline::ingestion::{ingest_batch, ingest_workbook, IngestionOptions, WorkbookInput};
use sheet_pipeline::pipeline::{Pipeline, PipelineConfig, PipelineEvent, PipelineObserver};
use sheet_pipeline::processing::{available_columns, select_sheets};
use sheet_pipeline::types::{Record, SheetKey, Value};
use sheet_pipeline::validation::validate_format;
use sheet_pipeline::PipelineError;

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("sheet-pipeline-{name}-{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn region_workbook(sheet: &str, rows: &[(&str, &str, f64)]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet).unwrap();
    ws.write_string(0, 0, "Region").unwrap();
    ws.write_string(0, 1, "Rep").unwrap();
    ws.write_string(0, 2, "Amount").unwrap();
    for (i, (region, rep, amount)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        ws.write_string(r, 0, *region).unwrap();
        ws.write_string(r, 1, *rep).unwrap();
        ws.write_number(r, 2, *amount).unwrap();
    }
    wb.save_to_buffer().unwrap()
}

#[derive(Default)]
struct EventLog(Mutex<Vec<PipelineEvent>>);

impl PipelineObserver for EventLog {
    fn on_event(&self, event: &PipelineEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn exported_workbook_reingests_with_same_headers_and_rows() {
    let records = vec![
        Record::from_iter([("name", Value::from("ann")), ("team", Value::from("red")), ("note", Value::Null)]),
        Record::from_iter([("name", Value::from("bob")), ("team", Value::Null), ("note", Value::from("late"))]),
        Record::from_iter([("name", Value::from("cy")), ("team", Value::from("blue")), ("note", Value::Null)]),
    ];
    let bytes = export_to_bytes(&records).unwrap();

    let sheets = ingest_workbook(&WorkbookInput::new("export.xlsx", bytes), &IngestionOptions::default()).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].sheet_name, EXPORT_SHEET_NAME);
    assert_eq!(sheets[0].headers, vec!["name", "team", "note"]);
    assert_eq!(sheets[0].rows, records);
}

#[test]
fn batch_select_extract_group_and_export() {
    let inputs = vec![
        WorkbookInput::new(
            "north.xlsx",
            region_workbook("Q1", &[("N", "ann", 10.0), ("N", "bob", 4.0), ("S", "cy", 1.5)]),
        ),
        WorkbookInput::new("south.xlsx", region_workbook("Q1", &[("S", "dee", 2.5), ("N", "ann", 6.0)])),
    ];
    let sheets = ingest_batch(&inputs, &IngestionOptions::default()).unwrap().sheets;
    assert_eq!(sheets.len(), 2);
    assert_eq!(available_columns(&sheets), vec!["Amount", "Region", "Rep"]);

    let config = PipelineConfig::from_json_str(
        r#"{
            "mappings": [
                { "sourceColumn": "Region", "targetColumn": "region", "required": true },
                { "sourceColumn": "Amount", "targetColumn": "amount" }
            ],
            "grouping": {
                "groupBy": ["region"],
                "aggregations": [
                    { "column": "amount", "operation": "sum" },
                    { "column": "amount", "operation": "count" },
                    { "column": "amount", "operation": "max" }
                ]
            },
            "expectedColumns": ["Region", "Amount"]
        }"#,
    )
    .unwrap();
    let events = Arc::new(EventLog::default());
    let pipeline = Pipeline::new(config).with_observer(events.clone());

    assert!(pipeline.validate(&sheets).is_valid);

    let selected = select_sheets(
        &sheets,
        &[
            SheetKey::new("south.xlsx", "Q1"),
            SheetKey::new("north.xlsx", "Q1"),
        ],
    );
    let output = pipeline.run(&selected).unwrap();
    assert_eq!(output.extracted.len(), 5);

    let grouped = output.grouped.as_ref().unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].value("region"), &Value::from("N"));
    assert_eq!(grouped[0].value("amount_sum"), &Value::Float64(20.0));
    assert_eq!(grouped[0].value("amount_count"), &Value::Int64(3));
    assert_eq!(grouped[0].value("amount_max"), &Value::Float64(10.0));
    assert_eq!(grouped[1].value("region"), &Value::from("S"));
    assert_eq!(grouped[1].value("amount_sum"), &Value::Float64(4.0));

    let dir = tmp_dir("export");
    let path = pipeline.export(output.result(), &dir, "Grouped Data").unwrap();
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("Grouped Data_"));
    assert!(file_name.ends_with("Z.xlsx"));
    assert!(!file_name.contains(':'));

    let reread = ingest_workbook(
        &WorkbookInput::from_path(&path).unwrap(),
        &IngestionOptions::default(),
    )
    .unwrap();
    assert_eq!(
        reread[0].headers,
        vec!["region", "amount_sum", "amount_count", "amount_max"]
    );
    assert_eq!(reread[0].rows[0].value("amount_sum"), &Value::from("20"));
    assert_eq!(reread[0].rows[1].value("amount_count"), &Value::from("2"));

    let kinds: Vec<&str> = events
        .0
        .lock()
        .unwrap()
        .iter()
        .map(|e| match e {
            PipelineEvent::ValidationFinished { .. } => "validation",
            PipelineEvent::ExtractionFinished { .. } => "extraction",
            PipelineEvent::ExtractionFailed { .. } => "extraction_failed",
            PipelineEvent::GroupingFinished { .. } => "grouping",
            PipelineEvent::ExportFinished { .. } => "export",
        })
        .collect();
    assert_eq!(kinds, vec!["validation", "extraction", "grouping", "export"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validation_flags_sheets_missing_expected_columns() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Leads").unwrap();
    ws.write_string(0, 0, "Rep").unwrap();
    ws.write_string(1, 0, "ann").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let inputs = vec![
        WorkbookInput::new("leads.xlsx", bytes),
        WorkbookInput::new("q1.xlsx", region_workbook("Q1", &[("N", "ann", 1.0)])),
    ];
    let sheets = ingest_batch(&inputs, &IngestionOptions::default()).unwrap().sheets;

    let report = validate_format(&sheets, &["Region", "Amount"]);
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec!["File leads.xlsx, Sheet Leads: Missing columns: Region, Amount".to_string()]
    );
}

#[test]
fn exporting_nothing_is_an_error() {
    let dir = tmp_dir("empty");
    let pipeline = Pipeline::new(PipelineConfig::default());
    assert!(matches!(
        pipeline.export(&[], &dir, "Extracted Data"),
        Err(PipelineError::EmptyDataset)
    ));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}
