use drilling_events::ingestion::csv::{read_csv_rows_from_bytes, read_csv_rows_from_path};
use drilling_events::parsing::{LogicalField, RejectReason};
use drilling_events::pipeline::{ingest, IngestionOutcome};
use drilling_events::types::CellValue;
use drilling_events::IngestionError;

#[test]
fn decodes_fixture_rows_with_free_form_headers() {
    let rows = read_csv_rows_from_path("tests/fixtures/eventos.csv").unwrap();
    // The blank line between records is not a row.
    assert_eq!(rows.len(), 6);
    assert_eq!(
        rows[0].keys().collect::<Vec<_>>(),
        vec!["Pozo", "Profundidad (m)", "Subcategoria NPT", "Comentario"]
    );
    assert_eq!(rows[0].get("Profundidad (m)"), Some(&CellValue::Text("2,900.00".to_string())));
    assert_eq!(rows[1].get("Comentario"), Some(&CellValue::Empty));
}

#[test]
fn fixture_sheet_builds_events_and_reports_rejections() {
    let rows = read_csv_rows_from_path("tests/fixtures/eventos.csv").unwrap();
    let report = ingest(&rows);

    let mapping = &report.diagnostics.mapping;
    assert_eq!(mapping.key_for(LogicalField::Well), Some("Pozo"));
    assert_eq!(mapping.key_for(LogicalField::Depth), Some("Profundidad (m)"));
    assert_eq!(mapping.key_for(LogicalField::Subcategory), Some("Subcategoria NPT"));
    assert_eq!(mapping.key_for(LogicalField::Comment), Some("Comentario"));

    let summary: Vec<(&str, f64, &str, &str)> = report
        .events
        .iter()
        .map(|e| (e.well.as_str(), e.depth, e.subcategory.as_str(), e.comment.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("CGC-101", 2900.0, "PERFORACION", "Pega de tuberia"),
            ("CGC-101", 1500.0, "CLIMA", ""),
            ("CGC-205", 1500.5, "Evento", "Viento fuerte"),
            ("YPF-7", 0.0, "ESPERA", ""),
        ]
    );

    assert_eq!(report.diagnostics.outcome, IngestionOutcome::Accepted);
    assert_eq!(report.diagnostics.total_rows, 6);
    assert_eq!(report.diagnostics.accepted(), 4);

    let rejections = &report.diagnostics.rejections;
    assert_eq!(rejections.len(), 2);
    assert_eq!(rejections[0].row, 3);
    assert_eq!(rejections[0].reason, RejectReason::EmptyWell);
    assert_eq!(rejections[1].row, 4);
    assert!(matches!(rejections[1].reason, RejectReason::InvalidDepth { depth, .. } if depth == -20.0));
}

#[test]
fn event_ids_follow_row_index_and_are_unique() {
    let rows = read_csv_rows_from_path("tests/fixtures/eventos.csv").unwrap();
    let report = ingest(&rows);

    assert!(report.events[0].id.starts_with("evt-0-"));
    assert!(report.events[3].id.starts_with("evt-5-"));
    for evt in &report.events {
        let suffix = evt.id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 9);
    }
    let mut ids: Vec<_> = report.events.iter().map(|e| e.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), report.events.len());
}

#[test]
fn unrecognized_headers_yield_no_valid_rows() {
    let rows = read_csv_rows_from_path("tests/fixtures/sin_columnas.csv").unwrap();
    let report = ingest(&rows);

    assert!(report.events.is_empty());
    assert!(report.has_no_valid_rows());
    assert_eq!(report.diagnostics.rejected(), 2);
    assert!(report
        .diagnostics
        .rejections
        .iter()
        .all(|r| r.reason == RejectReason::MissingWellColumn));
    assert_eq!(report.diagnostics.mapping.missing().len(), 4);
}

#[test]
fn header_only_sheet_is_empty_not_an_error() {
    let rows = read_csv_rows_from_path("tests/fixtures/solo_encabezado.csv").unwrap();
    assert!(rows.is_empty());

    let report = ingest(&rows);
    assert_eq!(report.diagnostics.outcome, IngestionOutcome::Empty);
    assert!(!report.has_no_valid_rows());
}

#[test]
fn short_records_are_padded() {
    let rows = read_csv_rows_from_bytes(b"pozo,prof_desde,comentario\nCGC-9,120\n").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("comentario"), Some(&CellValue::Empty));

    let report = ingest(&rows);
    assert_eq!(report.events[0].depth, 120.0);
    assert_eq!(report.events[0].comment, "");
}

#[test]
fn missing_file_is_an_error() {
    let err = read_csv_rows_from_path("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(matches!(err, IngestionError::Csv(_)));
}
