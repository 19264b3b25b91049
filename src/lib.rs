//! `drilling-events` turns operator-supplied spreadsheets of drilling events (well, depth, event
//! subcategory, comment) into a clean, de-duplicated collection of [`types::DrillingEvent`]s, and
//! merges that collection with a remote, append-mostly event store.
//!
//! The primary entrypoint is [`ingestion::ingest_from_path`], which auto-detects the sheet format
//! from the file extension (or you can force a format via [`ingestion::IngestionOptions`]).
//!
//! ## What you can ingest
//!
//! **File formats (auto-detected by extension):**
//!
//! - **Excel/workbooks** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array-of-objects) and `.ndjson` (newline-delimited objects)
//!
//! The first sheet is read by default; its first non-empty row is the header. Headers are free-form:
//! columns are located by synonym (`Pozo`, `WELL`, `prof_desde (m)`, ...), see [`parsing::columns`].
//!
//! **Depth values** may be written with either decimal convention and a unit suffix
//! (`"2,900.00"`, `"1.500,50"`, `"1500 m"`); see [`parsing::normalize_depth`].
//!
//! ## Quick example: ingest a sheet
//!
//! ```no_run
//! use drilling_events::ingestion::{ingest_from_path, IngestionOptions};
//!
//! # fn main() -> Result<(), drilling_events::IngestionError> {
//! let report = ingest_from_path("eventos_npt.xlsx", &IngestionOptions::default())?;
//! println!(
//!     "events={} rejected={}",
//!     report.events.len(),
//!     report.diagnostics.rejected()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Remote store
//!
//! [`store::EventRepository`] wraps any [`store::EventStore`]: it loads every page and drops the
//! duplicate rows the store accumulates, and uploads with an upsert that falls back to a plain
//! insert when the store lacks its uniqueness constraint.
//!
//! ```rust
//! use drilling_events::pipeline::ingest;
//! use drilling_events::store::{EventRepository, MemoryStore, StoreConfig};
//! use drilling_events::types::RawRow;
//!
//! let rows = vec![
//!     RawRow::new().with("Pozo", "CGC-101").with("Profundidad", "1500 m"),
//!     RawRow::new().with("Pozo", "CGC-101").with("Profundidad", "1.500,00"),
//! ];
//! let report = ingest(&rows);
//!
//! let repo = EventRepository::new(MemoryStore::new(), StoreConfig::new("mem://", "key")).unwrap();
//! // Uploads are not de-duplicated locally, and this store has no uniqueness constraint.
//! let written = repo.upload(&report.events).unwrap();
//! assert!(written.used_fallback);
//!
//! let loaded = repo.fetch_all().unwrap();
//! assert_eq!(loaded.fetched_rows, 2);
//! assert_eq!(loaded.events.len(), 1);
//! assert_eq!(loaded.events[0].subcategory, "Evento");
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified entrypoints, format decoders and observers
//! - [`parsing`]: depth normalization, column resolution, record building
//! - [`pipeline`]: sheet-level orchestration and diagnostics
//! - [`dedup`]: composite-key de-duplication
//! - [`store`]: remote store boundary, repository and in-memory store
//! - [`processing`]: filters and summaries over event collections
//! - [`types`]: cells, raw rows and events
//! - [`error`]: error types

pub mod dedup;
pub mod error;
pub mod ingestion;
pub mod parsing;
pub mod pipeline;
pub mod processing;
pub mod store;
pub mod types;

pub use error::{IngestionError, IngestionResult, StoreError, StoreResult};
