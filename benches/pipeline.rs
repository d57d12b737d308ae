use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sheet_pipeline::export::export_to_bytes;
use sheet_pipeline::ingestion::{ingest_workbook, IngestionOptions, WorkbookInput};
use sheet_pipeline::processing::{extract, group};
use sheet_pipeline::types::{AggregateOp, Aggregation, ColumnMapping, GroupingConfig, Record, Sheet, Value};

fn sales_sheet(rows: usize) -> Sheet {
    let regions = ["North", "South", "East", "West"];
    let rows = (0..rows)
        .map(|i| {
            Record::from_iter([
                ("Region", Value::from(regions[i % regions.len()])),
                ("Rep", Value::from(format!("rep-{}", i % 97))),
                ("Amount", Value::from(((i % 1000) as f64 * 1.25).to_string())),
            ])
        })
        .collect();
    Sheet {
        file_name: "bench.xlsx".to_string(),
        sheet_name: "Sales".to_string(),
        headers: vec!["Region".to_string(), "Rep".to_string(), "Amount".to_string()],
        rows,
    }
}

fn mappings() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::required("Region", "region"),
        ColumnMapping::new("Rep", "rep"),
        ColumnMapping::new("Amount", "amount"),
    ]
}

fn grouping() -> GroupingConfig {
    GroupingConfig {
        group_by: vec!["region".to_string(), "rep".to_string()],
        aggregations: vec![
            Aggregation::new("amount", AggregateOp::Sum),
            Aggregation::new("amount", AggregateOp::Average),
            Aggregation::new("amount", AggregateOp::Max),
        ],
    }
}

fn bench_extract_group(c: &mut Criterion) {
    let mut g = c.benchmark_group("extract_group");
    for &n in &[1_000usize, 50_000] {
        let sheets = vec![sales_sheet(n)];
        let mappings = mappings();
        let grouping = grouping();
        g.throughput(Throughput::Elements(n as u64));
        g.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let rows = extract(black_box(&sheets), &mappings).unwrap();
                black_box(group(&rows, &grouping))
            })
        });
    }
    g.finish();
}

fn bench_workbook_roundtrip(c: &mut Criterion) {
    let extracted = extract(&[sales_sheet(10_000)], &mappings()).unwrap();
    let bytes = export_to_bytes(&extracted).unwrap();
    let input = WorkbookInput::new("bench.xlsx", bytes);
    let options = IngestionOptions::default();

    c.bench_function("export_10k_rows", |b| {
        b.iter(|| black_box(export_to_bytes(black_box(&extracted)).unwrap()))
    });
    c.bench_function("ingest_10k_rows", |b| {
        b.iter(|| black_box(ingest_workbook(black_box(&input), &options).unwrap()))
    });
}

criterion_group!(benches, bench_extract_group, bench_workbook_roundtrip);
criterion_main!(benches);
