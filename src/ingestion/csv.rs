//! CSV decoding into [`RawRow`]s.

use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{CellValue, RawRow};

use super::unique_headers;

/// Read a CSV file into [`RawRow`]s.
///
/// Rules:
///
/// - The first record with a non-blank cell is the header row; leading blank records are
///   skipped and columns with a blank header are skipped.
/// - Every cell stays text (depth normalization happens later); blank cells become
///   [`CellValue::Empty`].
/// - Records that are entirely blank are skipped. Short records are padded with empty cells.
pub fn read_csv_rows_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    read_csv_rows_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
///
/// Readers built with `has_headers(true)` work too; their header record is treated like any
/// other leading record.
pub fn read_csv_rows_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<Vec<RawRow>> {
    let mut leading = Vec::new();
    if rdr.has_headers() {
        leading.push(rdr.headers()?.clone());
    }
    let mut records = leading
        .into_iter()
        .map(Ok::<_, csv::Error>)
        .chain(rdr.records());

    let mut headers = None;
    for result in records.by_ref() {
        let record = result?;
        if !is_blank(&record) {
            headers = Some(unique_headers(record.iter().map(str::to_string)));
            break;
        }
    }
    let Some(headers) = headers else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .map(|(idx, name)| {
                let raw = record.get(*idx).unwrap_or("");
                let value = if raw.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(raw.to_string())
                };
                (name.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Read CSV from an in-memory buffer.
pub fn read_csv_rows_from_bytes(bytes: &[u8]) -> IngestionResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    read_csv_rows_from_reader(&mut rdr)
}
