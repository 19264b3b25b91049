//! JSON decoding into [`RawRow`]s.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"pozo":"CGC-101"}, {"pozo":"CGC-205"}]`
//! - Newline-delimited JSON (NDJSON): `{"pozo":"CGC-101"}\n{"pozo":"CGC-205"}\n`
//!
//! Object key order is preserved, so header resolution sees keys in the order the producer
//! wrote them.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{CellValue, RawRow};

/// Read a JSON or NDJSON file into [`RawRow`]s.
pub fn read_json_rows_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<RawRow>> {
    let text = fs::read_to_string(path)?;
    read_json_rows_from_str(&text)
}

/// Read JSON from an in-memory string.
///
/// Blank input is an empty sheet, not an error.
pub fn read_json_rows_from_str(input: &str) -> IngestionResult<Vec<RawRow>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // First try parsing as a single JSON value (array or object).
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx0, v)| object_to_row(idx0 + 1, v))
            .collect(),
        Ok(v @ Value::Object(_)) => Ok(vec![object_to_row(1, &v)?]),
        Ok(_) => Err(IngestionError::MalformedInput {
            message: "json must be an object, an array of objects, or NDJSON".to_string(),
        }),
        Err(_) => {
            // Fall back to NDJSON.
            let mut rows = Vec::new();
            for (i, line) in trimmed.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<Value>(line).map_err(|e| {
                    IngestionError::MalformedInput {
                        message: format!("invalid ndjson at line {}: {}", i + 1, e),
                    }
                })?;
                rows.push(object_to_row(i + 1, &v)?);
            }
            Ok(rows)
        }
    }
}

fn object_to_row(row_num: usize, v: &Value) -> IngestionResult<RawRow> {
    let obj: &Map<String, Value> = v.as_object().ok_or_else(|| IngestionError::MalformedInput {
        message: format!("row {row_num} is not a json object"),
    })?;

    Ok(obj
        .iter()
        .map(|(k, v)| (k.clone(), convert_json_value(v)))
        .collect())
}

fn convert_json_value(v: &Value) -> CellValue {
    match v {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
        Value::String(s) => CellValue::Text(s.clone()),
        nested => CellValue::Text(nested.to_string()),
    }
}
