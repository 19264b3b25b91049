//! Sheet-level orchestration: rows in, events plus diagnostics out.
//!
//! ```rust
//! use drilling_events::pipeline::{IngestionOutcome, IngestionPipeline};
//! use drilling_events::types::RawRow;
//!
//! let rows = vec![
//!     RawRow::new()
//!         .with("Pozo", "CGC-101")
//!         .with("prof_desde", "1.500,50")
//!         .with("subcategoria_npt", "PERFORACION"),
//!     RawRow::new().with("Pozo", "").with("prof_desde", "10"),
//! ];
//!
//! let report = IngestionPipeline::default().ingest(&rows);
//! assert_eq!(report.events.len(), 1);
//! assert_eq!(report.events[0].depth, 1500.5);
//! assert_eq!(report.diagnostics.rejected(), 1);
//! assert_eq!(report.diagnostics.outcome, IngestionOutcome::Accepted);
//! ```

use tracing::{debug, warn};

use crate::parsing::{FieldMapping, FieldSpecs, RecordBuilder, RowRejection};
use crate::types::{DEFAULT_SUBCATEGORY, DrillingEvent, RawRow};

/// Overall classification of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The input had no rows. Not an error.
    Empty,
    /// Rows were present but none produced an event (usually unrecognized column names).
    NoValidRows,
    /// At least one event was produced.
    Accepted,
}

/// What happened while ingesting a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionDiagnostics {
    /// Number of input rows.
    pub total_rows: usize,
    /// Header mapping resolved from the first row.
    pub mapping: FieldMapping,
    /// Dropped rows, in input order.
    pub rejections: Vec<RowRejection>,
    pub outcome: IngestionOutcome,
}

impl IngestionDiagnostics {
    /// Number of dropped rows.
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    /// Number of rows that produced an event.
    pub fn accepted(&self) -> usize {
        self.total_rows - self.rejections.len()
    }
}

/// Events produced by a run, plus its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub events: Vec<DrillingEvent>,
    pub diagnostics: IngestionDiagnostics,
}

impl IngestionReport {
    /// True when the input was non-empty but yielded no events.
    pub fn has_no_valid_rows(&self) -> bool {
        self.diagnostics.outcome == IngestionOutcome::NoValidRows
    }
}

/// Runs column resolution and record building over a whole sheet.
///
/// Fresh uploads are authoritative, so the pipeline never de-duplicates; see
/// [`crate::dedup`] for merges from the remote store.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    specs: FieldSpecs,
    default_subcategory: String,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new(FieldSpecs::default())
    }
}

impl IngestionPipeline {
    pub fn new(specs: FieldSpecs) -> Self {
        Self {
            specs,
            default_subcategory: DEFAULT_SUBCATEGORY.to_string(),
        }
    }

    /// Override the subcategory assigned to rows without one.
    pub fn with_default_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.default_subcategory = subcategory.into();
        self
    }

    pub fn specs(&self) -> &FieldSpecs {
        &self.specs
    }

    /// Ingest one sheet's rows.
    ///
    /// The header mapping is resolved once, from the first row's keys.
    pub fn ingest(&self, rows: &[RawRow]) -> IngestionReport {
        let Some(first) = rows.first() else {
            return IngestionReport {
                events: Vec::new(),
                diagnostics: IngestionDiagnostics {
                    total_rows: 0,
                    mapping: FieldMapping::default(),
                    rejections: Vec::new(),
                    outcome: IngestionOutcome::Empty,
                },
            };
        };

        let mapping = FieldMapping::resolve(first.keys(), &self.specs);
        debug!(?mapping, "resolved sheet columns");
        let missing = mapping.missing();
        if !missing.is_empty() {
            debug!(?missing, "sheet has unresolved columns");
        }

        let builder = RecordBuilder::new(&mapping).with_default_subcategory(&self.default_subcategory);
        let mut events = Vec::with_capacity(rows.len());
        let mut rejections = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            match builder.build(row, idx) {
                Ok(evt) => events.push(evt),
                Err(rejection) => rejections.push(rejection),
            }
        }

        let outcome = if events.is_empty() {
            warn!(
                rows = rows.len(),
                "no valid rows; expected columns like pozo, prof_desde, subcategoria_npt, comentario"
            );
            IngestionOutcome::NoValidRows
        } else {
            IngestionOutcome::Accepted
        };
        debug!(
            accepted = events.len(),
            rejected = rejections.len(),
            "sheet ingested"
        );

        IngestionReport {
            events,
            diagnostics: IngestionDiagnostics {
                total_rows: rows.len(),
                mapping,
                rejections,
                outcome,
            },
        }
    }
}

/// Ingest rows with the default pipeline.
pub fn ingest(rows: &[RawRow]) -> IngestionReport {
    IngestionPipeline::default().ingest(rows)
}
