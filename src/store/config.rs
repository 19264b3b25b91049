use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Table holding drilling events.
pub const DEFAULT_TABLE: &str = "drilling_events";
/// Rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;
/// Safety cap on rows accumulated by one paginated load.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Connection and paging parameters for a remote event store.
///
/// Constructed explicitly and handed to [`super::EventRepository`]; there is no process-wide
/// client. Can be loaded from JSON:
///
/// ```rust
/// use drilling_events::store::StoreConfig;
///
/// let cfg = StoreConfig::from_json_str(
///     r#"{"endpoint": "https://db.example.com", "api_key": "k", "page_size": 500}"#,
/// )
/// .unwrap();
/// assert_eq!(cfg.page_size, 500);
/// assert_eq!(cfg.table, "drilling_events");
/// assert_eq!(cfg.max_rows, 100_000);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store.
    pub endpoint: String,
    /// Credential sent with every request.
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Paginated loads stop (and truncate) once this many rows have accumulated.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            table: default_table(),
            page_size: DEFAULT_PAGE_SIZE,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(input: &str) -> StoreResult<Self> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that the config can drive a paginated load.
    pub fn validate(&self) -> StoreResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(StoreError::Configuration("endpoint must not be empty".to_string()));
        }
        if self.table.trim().is_empty() {
            return Err(StoreError::Configuration("table must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(StoreError::Configuration("page_size must be > 0".to_string()));
        }
        if self.max_rows == 0 {
            return Err(StoreError::Configuration("max_rows must be > 0".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("table", &self.table)
            .field("page_size", &self.page_size)
            .field("max_rows", &self.max_rows)
            .finish()
    }
}
