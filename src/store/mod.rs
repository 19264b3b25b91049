//! Remote event store boundary.
//!
//! The store is modeled as the [`EventStore`] trait: a paginated read ordered by depth, a bulk
//! upsert with a declared uniqueness constraint, a plain bulk insert, and a single insert that
//! returns the stored row. Transport (HTTP, SQL, ...) lives in implementations; this crate ships
//! [`MemoryStore`] for tests and offline use.
//!
//! [`EventRepository`] is the explicitly constructed client handle that callers use: it owns a
//! store plus a [`StoreConfig`] and implements the fetch-all merge and the upload fallback.

mod config;
mod memory;
mod repository;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreResult;
use crate::types::{DrillingEvent, NewDrillingEvent};

pub use config::{StoreConfig, DEFAULT_MAX_ROWS, DEFAULT_PAGE_SIZE, DEFAULT_TABLE};
pub use memory::MemoryStore;
pub use repository::{EventRepository, FetchReport, WriteOutcome};

/// Columns forming the store's uniqueness constraint, used as the upsert conflict target.
pub const UNIQUE_COLUMNS: [&str; 3] = ["pozo", "prof_desde", "subcategoria_npt"];

/// A row as returned by the store.
///
/// Looser than [`DrillingEvent`]: stores hold rows written by older clients, so the subcategory
/// and comment may be missing, the id may be numeric, the well may be null and the depth may be
/// stored as text. Such rows still decode; [`StoredEvent::into_event`] decides whether they are
/// usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "pozo", default, deserialize_with = "text_or_null")]
    pub well: String,
    #[serde(rename = "prof_desde", default, deserialize_with = "lenient_depth")]
    pub depth: f64,
    #[serde(rename = "subcategoria_npt", default)]
    pub subcategory: Option<String>,
    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
}

impl StoredEvent {
    /// Convert into a canonical event.
    ///
    /// Returns `None` for rows that cannot satisfy the event invariants (blank well, negative or
    /// non-finite depth).
    pub fn into_event(self, default_subcategory: &str) -> Option<DrillingEvent> {
        let well = self.well.trim().to_string();
        if well.is_empty() || !self.depth.is_finite() || self.depth < 0.0 {
            return None;
        }
        let subcategory = self
            .subcategory
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_subcategory.to_string());

        Some(DrillingEvent {
            id: self.id,
            well,
            depth: self.depth,
            subcategory,
            comment: self.comment.map(|c| c.trim().to_string()).unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.into_text())
}

fn text_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

/// Null and blank text read as `0`; unparseable text reads as NaN so the row is dropped later.
fn lenient_depth<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Depth>::deserialize(deserializer)? {
        None => 0.0,
        Some(Depth::Number(n)) => n,
        Some(Depth::Text(s)) => match s.trim() {
            "" => 0.0,
            t => t.parse().unwrap_or(f64::NAN),
        },
    })
}

/// Paginated, append-mostly event store.
///
/// All methods are synchronous; callers issue one request at a time.
pub trait EventStore {
    /// Rows `offset..offset + limit` of `table`, ordered by depth ascending.
    fn fetch_page(&self, table: &str, offset: usize, limit: usize) -> StoreResult<Vec<StoredEvent>>;

    /// Insert rows, skipping any that collide on `conflict_columns`.
    ///
    /// Fails if the store has no uniqueness constraint over those columns.
    fn upsert(&self, table: &str, rows: &[NewDrillingEvent], conflict_columns: &[&str]) -> StoreResult<()>;

    /// Insert rows unconditionally.
    fn insert(&self, table: &str, rows: &[NewDrillingEvent]) -> StoreResult<()>;

    /// Insert one row and return it with its store-assigned id.
    fn insert_one(&self, table: &str, row: &NewDrillingEvent) -> StoreResult<StoredEvent>;
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn fetch_page(&self, table: &str, offset: usize, limit: usize) -> StoreResult<Vec<StoredEvent>> {
        (**self).fetch_page(table, offset, limit)
    }

    fn upsert(&self, table: &str, rows: &[NewDrillingEvent], conflict_columns: &[&str]) -> StoreResult<()> {
        (**self).upsert(table, rows, conflict_columns)
    }

    fn insert(&self, table: &str, rows: &[NewDrillingEvent]) -> StoreResult<()> {
        (**self).insert(table, rows)
    }

    fn insert_one(&self, table: &str, row: &NewDrillingEvent) -> StoreResult<StoredEvent> {
        (**self).insert_one(table, row)
    }
}
