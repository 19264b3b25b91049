//! Core data model types.
//!
//! Sheets decode into [`RawRow`]s (ordered header → [`CellValue`] maps with no assumed key set).
//! The parsing layer turns each row into a canonical [`DrillingEvent`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subcategory assigned to events whose source row carries none.
pub const DEFAULT_SUBCATEGORY: &str = "Evento";

/// A single scalar cell as delivered by a sheet decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing/empty cell.
    Empty,
    /// Native numeric cell.
    Number(f64),
    /// Text cell (untrimmed, as found in the source).
    Text(String),
    /// Boolean cell.
    Bool(bool),
}

impl CellValue {
    /// Whether the value counts as "nothing there": empty, blank text, `false`, zero or NaN.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Text(s) => s.is_empty(),
            Self::Bool(b) => !b,
        }
    }

    /// Text rendering of the value, or `None` for [`CellValue::Empty`].
    ///
    /// Whole numbers render without a fractional part (`101.0` → `"101"`), so numeric well
    /// names survive the round trip through a spreadsheet.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    /// Trimmed text rendering; empty cells become `""`.
    pub fn trimmed_text(&self) -> String {
        self.to_text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text().unwrap_or_default())
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// One sheet row: an ordered mapping from the sheet's own header strings to cell values.
///
/// Keys keep their original spelling and order. Inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cell.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key, value)),
        }
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value stored under `key` (exact match).
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Header keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    /// Cells in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Canonical drilling event.
///
/// Serialized with the store's column names so the same type crosses the remote boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillingEvent {
    /// Local `evt-*` id for freshly parsed rows, or the store-assigned id once committed.
    pub id: String,
    /// Wellbore name (trimmed, never empty).
    #[serde(rename = "pozo")]
    pub well: String,
    /// Measured depth in meters (finite, `>= 0`).
    #[serde(rename = "prof_desde")]
    pub depth: f64,
    /// Event classification (never empty).
    #[serde(rename = "subcategoria_npt")]
    pub subcategory: String,
    /// Free-text comment, possibly empty.
    #[serde(rename = "comentario", default)]
    pub comment: String,
}

impl DrillingEvent {
    /// Strip the id, producing the write payload for the store.
    pub fn to_new(&self) -> NewDrillingEvent {
        NewDrillingEvent {
            well: self.well.clone(),
            depth: self.depth,
            subcategory: self.subcategory.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// A drilling event that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDrillingEvent {
    #[serde(rename = "pozo")]
    pub well: String,
    #[serde(rename = "prof_desde")]
    pub depth: f64,
    #[serde(rename = "subcategoria_npt")]
    pub subcategory: String,
    #[serde(rename = "comentario", default)]
    pub comment: String,
}

impl NewDrillingEvent {
    /// Attach an id.
    pub fn with_id(self, id: impl Into<String>) -> DrillingEvent {
        DrillingEvent {
            id: id.into(),
            well: self.well,
            depth: self.depth,
            subcategory: self.subcategory,
            comment: self.comment,
        }
    }
}
