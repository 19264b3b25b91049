use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for remote store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type returned when a sheet cannot be decoded at all.
///
/// Row-level defects (a missing well name, a negative depth) are never errors: they are reported
/// as [`crate::parsing::RowRejection`]s inside the ingestion diagnostics.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bytes decoded, but do not form a usable sheet (no sheets, no header row, ...).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// The input format could not be inferred or is not enabled in this build.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
}

/// Which remote store operation produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    FetchPage,
    Upsert,
    Insert,
    InsertOne,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FetchPage => "fetch page",
            Self::Upsert => "upsert",
            Self::Insert => "insert",
            Self::InsertOne => "insert one",
        };
        f.write_str(name)
    }
}

/// Error type for the remote event store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused or failed a single operation.
    #[error("store rejected {operation}: {message}")]
    Rejected {
        operation: StoreOperation,
        message: String,
    },

    /// A page fetch failed; the whole paginated load is aborted.
    #[error("page fetch failed at offset {offset} (limit {limit}): {source}")]
    PageFetch {
        offset: usize,
        limit: usize,
        #[source]
        source: Box<StoreError>,
    },

    /// Both the upsert and the plain insert fallback failed.
    #[error("write failed: upsert: {upsert}; insert fallback: {insert}")]
    WriteFailed { upsert: String, insert: String },

    /// Store configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding a configuration file or a store payload failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand used by [`crate::store::EventStore`] implementations.
    pub fn rejected(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }
}
