//! Sheet decoding and ingestion entrypoints.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_from_bytes`] (from [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IngestionOptions`])
//! - decode the first (or a named) sheet into [`crate::types::RawRow`]s
//! - run the rows through [`crate::pipeline::IngestionPipeline`]
//! - optionally report success/empty-result/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific decoders are also available under:
//! - [`csv`]
//! - [`json`]
//! - `excel` (Cargo feature `excel`, on by default)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use unified::{
    ingest_from_bytes, ingest_from_path, read_rows_from_bytes, read_rows_from_path, IngestionFormat,
    IngestionOptions, SheetSelection,
};

/// Pair each non-blank header cell with its column index.
///
/// Headers are trimmed; a repeated header gets a `_1`, `_2`, ... suffix so every key of a
/// [`crate::types::RawRow`] stays unique.
pub(crate) fn unique_headers(cells: impl Iterator<Item = String>) -> Vec<(usize, String)> {
    let mut out: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in cells.enumerate() {
        let base = raw.trim().to_string();
        if base.is_empty() {
            continue;
        }
        let mut name = base.clone();
        let mut n = 0;
        while out.iter().any(|(_, existing)| *existing == name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        out.push((idx, name));
    }
    out
}
