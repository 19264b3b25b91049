//! Unified ingestion entrypoints.
//!
//! Most callers should use [`ingest_from_path`] (or [`ingest_from_bytes`] for uploads), which
//! decodes a sheet into [`RawRow`]s and runs it through the
//! [`crate::pipeline::IngestionPipeline`].
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//! - If an [`super::observability::IngestionObserver`] is provided, outcomes are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{IngestionError, IngestionResult};
use crate::parsing::FieldSpecs;
use crate::pipeline::{IngestionOutcome, IngestionPipeline, IngestionReport};
use crate::types::{DEFAULT_SUBCATEGORY, RawRow};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Supported sheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which worksheet to read from a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// The first sheet (default).
    #[default]
    First,
    /// A single named sheet.
    Named(String),
}

impl SheetSelection {
    fn name(&self) -> Option<&str> {
        match self {
            Self::First => None,
            Self::Named(name) => Some(name.as_str()),
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Workbook sheet to read.
    pub sheet: SheetSelection,
    /// Header synonyms per logical field.
    pub field_specs: FieldSpecs,
    /// Subcategory assigned to rows without one.
    pub default_subcategory: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("sheet", &self.sheet)
            .field("field_specs", &self.field_specs)
            .field("default_subcategory", &self.default_subcategory)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet: SheetSelection::default(),
            field_specs: FieldSpecs::default(),
            default_subcategory: DEFAULT_SUBCATEGORY.to_string(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl IngestionOptions {
    fn pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(self.field_specs.clone())
            .with_default_subcategory(self.default_subcategory.clone())
    }
}

/// Ingest a sheet file into canonical events.
///
/// Decoding failures (unreadable file, corrupt workbook, unknown extension) are returned as
/// errors with no partial result. A sheet that decodes but yields no events is *not* an error:
/// check [`IngestionReport::has_no_valid_rows`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` when events were produced (or the sheet was empty)
/// - `on_no_valid_rows` when a non-empty sheet produced nothing
/// - `on_failure` on decoding failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use drilling_events::ingestion::{ingest_from_path, IngestionOptions, StdErrObserver};
///
/// # fn main() -> Result<(), drilling_events::IngestionError> {
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let report = ingest_from_path("eventos_npt.xlsx", &opts)?;
/// if report.has_no_valid_rows() {
///     eprintln!("expected columns: pozo, prof_desde, subcategoria_npt, comentario");
/// }
/// println!("events={}", report.events.len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<IngestionReport> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => match infer_format_from_path(path) {
            Ok(f) => f,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot infer sheet format");
                return Err(e);
            }
        },
    };

    let ctx = IngestionContext {
        source: path.display().to_string(),
        format: fmt,
    };
    let rows = read_rows_from_path(path, fmt, &options.sheet);
    finish(&ctx, rows, options)
}

/// Ingest an uploaded sheet held in memory.
///
/// `source` is only used to label observer callbacks and logs (e.g. the uploaded file name).
pub fn ingest_from_bytes(
    bytes: &[u8],
    format: IngestionFormat,
    source: &str,
    options: &IngestionOptions,
) -> IngestionResult<IngestionReport> {
    let ctx = IngestionContext {
        source: source.to_string(),
        format,
    };
    let rows = read_rows_from_bytes(bytes, format, &options.sheet);
    finish(&ctx, rows, options)
}

/// Decode a sheet file into raw rows without building events.
pub fn read_rows_from_path(
    path: &Path,
    format: IngestionFormat,
    sheet: &SheetSelection,
) -> IngestionResult<Vec<RawRow>> {
    match format {
        IngestionFormat::Csv => csv::read_csv_rows_from_path(path),
        IngestionFormat::Json => json::read_json_rows_from_path(path),
        IngestionFormat::Excel => read_excel_path_dispatch(path, sheet),
    }
}

/// Decode an in-memory sheet into raw rows without building events.
pub fn read_rows_from_bytes(
    bytes: &[u8],
    format: IngestionFormat,
    sheet: &SheetSelection,
) -> IngestionResult<Vec<RawRow>> {
    match format {
        IngestionFormat::Csv => csv::read_csv_rows_from_bytes(bytes),
        IngestionFormat::Json => {
            let text = std::str::from_utf8(bytes).map_err(|e| IngestionError::MalformedInput {
                message: format!("json input is not valid utf-8: {e}"),
            })?;
            json::read_json_rows_from_str(text)
        }
        IngestionFormat::Excel => read_excel_bytes_dispatch(bytes, sheet),
    }
}

fn finish(
    ctx: &IngestionContext,
    rows: IngestionResult<Vec<RawRow>>,
    options: &IngestionOptions,
) -> IngestionResult<IngestionReport> {
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            let sev = severity_for_error(&e);
            error!(source = %ctx.source, format = ?ctx.format, severity = ?sev, error = %e, "sheet decoding failed");
            if let Some(obs) = options.observer.as_ref() {
                obs.on_failure(ctx, sev, &e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, &e);
                }
            }
            return Err(e);
        }
    };

    let report = options.pipeline().ingest(&rows);
    let stats = IngestionStats {
        rows: report.diagnostics.total_rows,
        events: report.events.len(),
        rejected: report.diagnostics.rejected(),
    };
    info!(
        source = %ctx.source,
        format = ?ctx.format,
        rows = stats.rows,
        events = stats.events,
        rejected = stats.rejected,
        "sheet ingested"
    );

    if let Some(obs) = options.observer.as_ref() {
        match report.diagnostics.outcome {
            IngestionOutcome::NoValidRows => obs.on_no_valid_rows(ctx, stats),
            IngestionOutcome::Empty | IngestionOutcome::Accepted => obs.on_success(ctx, stats),
        }
    }

    Ok(report)
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(calamine::Error::Io(_)) => IngestionSeverity::Critical,
        #[cfg(feature = "excel")]
        IngestionError::Excel(_) => IngestionSeverity::Error,
        IngestionError::Json(_) => IngestionSeverity::Error,
        IngestionError::MalformedInput { .. } => IngestionSeverity::Error,
        IngestionError::UnsupportedFormat { .. } => IngestionSeverity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::UnsupportedFormat {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFormat {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn read_excel_path_dispatch(path: &Path, sheet: &SheetSelection) -> IngestionResult<Vec<RawRow>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_rows_from_path(path, sheet.name())
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(excel_disabled())
    }
}

fn read_excel_bytes_dispatch(bytes: &[u8], sheet: &SheetSelection) -> IngestionResult<Vec<RawRow>> {
    let _ = (bytes, sheet);

    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_rows_from_bytes(bytes, sheet.name())
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(excel_disabled())
    }
}

#[cfg(not(feature = "excel"))]
fn excel_disabled() -> IngestionError {
    IngestionError::UnsupportedFormat {
        message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{infer_format_from_path, IngestionFormat};

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_extension("XLSX"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("ods"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("NdJson"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("Csv"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("parquet"), None);
    }

    #[test]
    fn infer_format_errors_are_unsupported_format() {
        let err = infer_format_from_path(Path::new("eventos")).unwrap_err();
        assert!(err.to_string().contains("path has no extension"));

        let err = infer_format_from_path(Path::new("eventos.pdf")).unwrap_err();
        assert!(err.to_string().contains("extension 'pdf'"));
    }
}
