#![cfg(feature = "excel")]

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{CellValue, RawRow};

use super::unique_headers;

/// Read one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into [`RawRow`]s.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row; a sheet with no such row yields no rows
/// - Columns with an empty header are skipped; repeated headers get `_1`, `_2`, ... suffixes
/// - Fully empty rows are skipped; empty cells are kept as [`CellValue::Empty`]
pub fn read_excel_rows_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
) -> IngestionResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path)?;
    read_sheet(&mut workbook, sheet_name)
}

/// Same as [`read_excel_rows_from_path`], for an uploaded byte buffer.
pub fn read_excel_rows_from_bytes(
    bytes: &[u8],
    sheet_name: Option<&str>,
) -> IngestionResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_sheet(&mut workbook, sheet_name)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet_name: Option<&str>,
) -> IngestionResult<Vec<RawRow>> {
    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestionError::MalformedInput {
                message: "workbook has no sheets".to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows_iter = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let Some(header_cells) = rows_iter.next() else {
        return Vec::new();
    };
    let headers = unique_headers(header_cells.iter().map(cell_to_header_string));

    let mut rows = Vec::new();
    for row in rows_iter {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let raw: RawRow = headers
            .iter()
            .map(|(idx, name)| {
                let cell = row.get(*idx).unwrap_or(&Data::Empty);
                (name.clone(), convert_cell(cell))
            })
            .collect();
        rows.push(raw);
    }
    rows
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) => CellValue::Number(*f).to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
    }
}
