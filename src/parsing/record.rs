//! Row → [`DrillingEvent`] conversion.

use thiserror::Error;
use uuid::Uuid;

use crate::types::{CellValue, DEFAULT_SUBCATEGORY, DrillingEvent, RawRow};

use super::columns::FieldMapping;
use super::number::normalize_depth;

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    /// No header in the sheet resolved to the well field.
    #[error("no well column")]
    MissingWellColumn,
    /// The well cell is empty or blank.
    #[error("empty well name")]
    EmptyWell,
    /// The depth normalized to a negative or non-finite value.
    #[error("invalid depth {depth} (raw='{raw}')")]
    InvalidDepth { depth: f64, raw: String },
}

/// A dropped row and the reason.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {reason}")]
pub struct RowRejection {
    /// 0-based index of the row within the batch.
    pub row: usize,
    pub reason: RejectReason,
}

/// Builds events from rows of one sheet, using a mapping resolved once for that sheet.
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    mapping: &'a FieldMapping,
    default_subcategory: &'a str,
}

impl<'a> RecordBuilder<'a> {
    /// Builder using [`DEFAULT_SUBCATEGORY`] for rows without one.
    pub fn new(mapping: &'a FieldMapping) -> Self {
        Self {
            mapping,
            default_subcategory: DEFAULT_SUBCATEGORY,
        }
    }

    /// Override the subcategory assigned to rows without one.
    pub fn with_default_subcategory(mut self, subcategory: &'a str) -> Self {
        self.default_subcategory = subcategory;
        self
    }

    /// Convert one row.
    ///
    /// The well is the only mandatory field. Missing depth becomes `0.0`, missing subcategory the
    /// default, missing comment `""`. A subcategory cell holding `0` or `false` counts as missing.
    pub fn build(&self, row: &RawRow, row_index: usize) -> Result<DrillingEvent, RowRejection> {
        let reject = |reason| RowRejection {
            row: row_index,
            reason,
        };

        let well_key = self
            .mapping
            .well
            .as_deref()
            .ok_or_else(|| reject(RejectReason::MissingWellColumn))?;
        let well = cell(row, Some(well_key)).trimmed_text();
        if well.is_empty() {
            return Err(reject(RejectReason::EmptyWell));
        }

        let depth_cell = cell(row, self.mapping.depth.as_deref());
        let depth = normalize_depth(depth_cell);
        if !depth.is_finite() || depth < 0.0 {
            return Err(reject(RejectReason::InvalidDepth {
                depth,
                raw: depth_cell.to_string(),
            }));
        }

        let subcategory_cell = cell(row, self.mapping.subcategory.as_deref());
        let subcategory = match subcategory_cell.trimmed_text() {
            s if s.is_empty() || subcategory_cell.is_falsy() => {
                self.default_subcategory.to_string()
            }
            s => s,
        };
        let comment = cell(row, self.mapping.comment.as_deref()).trimmed_text();

        Ok(DrillingEvent {
            id: synthesize_id(row_index),
            well,
            depth,
            subcategory,
            comment,
        })
    }
}

/// Convert one row with the default subcategory. See [`RecordBuilder::build`].
pub fn build_record(
    row: &RawRow,
    mapping: &FieldMapping,
    row_index: usize,
) -> Result<DrillingEvent, RowRejection> {
    RecordBuilder::new(mapping).build(row, row_index)
}

fn cell<'r>(row: &'r RawRow, key: Option<&str>) -> &'r CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    key.and_then(|k| row.get(k)).unwrap_or(EMPTY)
}

/// Local id for a freshly parsed row: `evt-<row>-<9 random chars>`.
///
/// Only meant to be unique within a batch; the store assigns the durable id.
fn synthesize_id(row_index: usize) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("evt-{row_index}-{}", &suffix[..9])
}

#[cfg(test)]
mod tests {
    use super::{build_record, RecordBuilder, RejectReason};
    use crate::parsing::columns::{FieldMapping, FieldSpecs};
    use crate::types::{CellValue, RawRow};

    fn mapping_for(row: &RawRow) -> FieldMapping {
        FieldMapping::resolve(row.keys(), &FieldSpecs::default())
    }

    #[test]
    fn builds_event_from_latam_formatted_row() {
        let row = RawRow::new()
            .with("Pozo", "CGC-101")
            .with("prof_desde", "1.500,50")
            .with("subcategoria_npt", "PERFORACION");
        let evt = build_record(&row, &mapping_for(&row), 0).unwrap();

        assert_eq!(evt.well, "CGC-101");
        assert_eq!(evt.depth, 1500.5);
        assert_eq!(evt.subcategory, "PERFORACION");
        assert_eq!(evt.comment, "");
        assert!(evt.id.starts_with("evt-0-"));
        assert_eq!(evt.id.len(), "evt-0-".len() + 9);
    }

    #[test]
    fn trims_text_fields() {
        let row = RawRow::new()
            .with("well", "  CGC-205 ")
            .with("depth", 600.0)
            .with("subcategoria", " CLIMA ")
            .with("Comentario", "  Espera por clima  ");
        let evt = build_record(&row, &mapping_for(&row), 3).unwrap();

        assert_eq!(evt.well, "CGC-205");
        assert_eq!(evt.depth, 600.0);
        assert_eq!(evt.subcategory, "CLIMA");
        assert_eq!(evt.comment, "Espera por clima");
    }

    #[test]
    fn missing_subcategory_and_depth_use_defaults() {
        let row = RawRow::new().with("pozo", "CGC-330").with("subcategoria_npt", "   ");
        let evt = build_record(&row, &mapping_for(&row), 1).unwrap();

        assert_eq!(evt.depth, 0.0);
        assert_eq!(evt.subcategory, "Evento");
    }

    #[test]
    fn zero_or_false_subcategory_falls_back_to_default() {
        let row = RawRow::new()
            .with("pozo", "CGC-101")
            .with("prof_desde", 10.0)
            .with("subcategoria_npt", 0.0);
        assert_eq!(build_record(&row, &mapping_for(&row), 0).unwrap().subcategory, "Evento");

        let row = RawRow::new()
            .with("pozo", "CGC-101")
            .with("subcategoria_npt", CellValue::Bool(false));
        assert_eq!(build_record(&row, &mapping_for(&row), 0).unwrap().subcategory, "Evento");

        let row = RawRow::new()
            .with("pozo", "CGC-101")
            .with("subcategoria_npt", 12.0);
        assert_eq!(build_record(&row, &mapping_for(&row), 0).unwrap().subcategory, "12");
    }

    #[test]
    fn custom_default_subcategory() {
        let row = RawRow::new().with("pozo", "CGC-330");
        let mapping = mapping_for(&row);
        let evt = RecordBuilder::new(&mapping)
            .with_default_subcategory("DEFAULT")
            .build(&row, 0)
            .unwrap();
        assert_eq!(evt.subcategory, "DEFAULT");
    }

    #[test]
    fn numeric_well_names_are_stringified() {
        let row = RawRow::new().with("pozo", 101.0).with("md", "850 m");
        let evt = build_record(&row, &mapping_for(&row), 0).unwrap();
        assert_eq!(evt.well, "101");
        assert_eq!(evt.depth, 850.0);
    }

    #[test]
    fn rejects_rows_without_well_column() {
        let row = RawRow::new().with("prof_desde", 10.0);
        let err = build_record(&row, &mapping_for(&row), 7).unwrap_err();
        assert_eq!(err.row, 7);
        assert_eq!(err.reason, RejectReason::MissingWellColumn);
    }

    #[test]
    fn rejects_blank_well() {
        let row = RawRow::new().with("pozo", "   ").with("prof_desde", 10.0);
        let mapping = mapping_for(&row);
        assert_eq!(
            build_record(&row, &mapping, 0).unwrap_err().reason,
            RejectReason::EmptyWell
        );

        let row = RawRow::new().with("pozo", CellValue::Empty);
        assert_eq!(
            build_record(&row, &mapping, 0).unwrap_err().reason,
            RejectReason::EmptyWell
        );
    }

    #[test]
    fn rejects_negative_depth() {
        let row = RawRow::new().with("pozo", "CGC-101").with("prof_desde", "-5");
        let err = build_record(&row, &mapping_for(&row), 2).unwrap_err();
        assert!(matches!(err.reason, RejectReason::InvalidDepth { depth, .. } if depth == -5.0));
        assert_eq!(err.to_string(), "row 2: invalid depth -5 (raw='-5')");
    }

    #[test]
    fn ids_are_unique_within_a_batch() {
        let row = RawRow::new().with("pozo", "CGC-101");
        let mapping = mapping_for(&row);
        let ids: std::collections::HashSet<String> = (0..200)
            .map(|i| build_record(&row, &mapping, i).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 200);
    }
}
