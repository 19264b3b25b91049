use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{StoreError, StoreOperation, StoreResult};
use crate::types::NewDrillingEvent;

use super::{EventStore, StoredEvent, UNIQUE_COLUMNS};

/// In-process [`EventStore`].
///
/// Behaves like a relational table that may or may not carry the
/// `(pozo, prof_desde, subcategoria_npt)` uniqueness constraint:
///
/// - without the constraint, [`EventStore::upsert`] fails and [`EventStore::insert`] appends
///   everything, duplicates included;
/// - with it, upserts skip colliding rows and inserts containing a collision fail.
///
/// Failures can be injected to exercise callers' error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<StoredEvent>>,
    next_id: u64,
    unique_constraint: bool,
    fail_fetch_at_offset: Option<usize>,
    fail_inserts: bool,
    fetch_calls: Vec<(usize, usize)>,
    upsert_calls: usize,
    insert_calls: usize,
}

type RowKey = (String, u64, String);

fn row_key(well: &str, depth: f64, subcategory: &str) -> RowKey {
    (well.to_string(), depth.to_bits(), subcategory.to_string())
}

fn stored_key(row: &StoredEvent) -> RowKey {
    row_key(&row.well, row.depth, row.subcategory.as_deref().unwrap_or_default())
}

fn new_key(row: &NewDrillingEvent) -> RowKey {
    row_key(&row.well, row.depth, &row.subcategory)
}

impl MemoryStore {
    /// Empty store without a uniqueness constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the `(pozo, prof_desde, subcategoria_npt)` uniqueness constraint.
    pub fn with_unique_constraint(self) -> Self {
        self.lock().unique_constraint = true;
        self
    }

    /// Seed `table` with existing rows (kept as-is, duplicates included).
    ///
    /// Ids assigned later continue after the largest numeric id seeded.
    pub fn with_rows(self, table: &str, rows: impl IntoIterator<Item = StoredEvent>) -> Self {
        {
            let mut state = self.lock();
            let rows: Vec<StoredEvent> = rows.into_iter().collect();
            let max_id = rows.iter().filter_map(|r| r.id.parse::<u64>().ok()).max();
            if let Some(max_id) = max_id {
                state.next_id = state.next_id.max(max_id);
            }
            state.tables.entry(table.to_string()).or_default().extend(rows);
        }
        self
    }

    /// Make the page request starting at `offset` fail.
    pub fn fail_fetch_at(self, offset: usize) -> Self {
        self.lock().fail_fetch_at_offset = Some(offset);
        self
    }

    /// Make every insert (bulk and single) fail.
    pub fn fail_inserts(self) -> Self {
        self.lock().fail_inserts = true;
        self
    }

    /// Snapshot of `table` in insertion order.
    pub fn rows(&self, table: &str) -> Vec<StoredEvent> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// `(offset, limit)` of every page request, in order.
    pub fn fetch_calls(&self) -> Vec<(usize, usize)> {
        self.lock().fetch_calls.clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.lock().upsert_calls
    }

    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn append(&mut self, table: &str, row: &NewDrillingEvent) -> StoredEvent {
        self.next_id += 1;
        let stored = StoredEvent {
            id: self.next_id.to_string(),
            well: row.well.clone(),
            depth: row.depth,
            subcategory: Some(row.subcategory.clone()),
            comment: Some(row.comment.clone()),
        };
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        stored
    }

    fn existing_keys(&self, table: &str) -> HashSet<RowKey> {
        self.tables
            .get(table)
            .map(|rows| rows.iter().map(stored_key).collect())
            .unwrap_or_default()
    }

    fn check_insertable(&self, table: &str, rows: &[NewDrillingEvent], op: StoreOperation) -> StoreResult<()> {
        if self.fail_inserts {
            return Err(StoreError::rejected(op, "insert failed (injected)"));
        }
        if self.unique_constraint {
            let mut keys = self.existing_keys(table);
            if let Some(dup) = rows.iter().find(|r| !keys.insert(new_key(r))) {
                return Err(StoreError::rejected(
                    op,
                    format!(
                        "duplicate key violates unique constraint ({}, {}, {})",
                        dup.well, dup.depth, dup.subcategory
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl EventStore for MemoryStore {
    fn fetch_page(&self, table: &str, offset: usize, limit: usize) -> StoreResult<Vec<StoredEvent>> {
        let mut state = self.lock();
        state.fetch_calls.push((offset, limit));
        if state.fail_fetch_at_offset == Some(offset) {
            return Err(StoreError::rejected(
                StoreOperation::FetchPage,
                format!("connection reset at offset {offset} (injected)"),
            ));
        }

        let mut rows = state.tables.get(table).cloned().unwrap_or_default();
        rows.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    fn upsert(&self, table: &str, rows: &[NewDrillingEvent], conflict_columns: &[&str]) -> StoreResult<()> {
        let mut state = self.lock();
        state.upsert_calls += 1;
        if !state.unique_constraint || conflict_columns != UNIQUE_COLUMNS {
            return Err(StoreError::rejected(
                StoreOperation::Upsert,
                "there is no unique or exclusion constraint matching the ON CONFLICT specification",
            ));
        }
        if state.fail_inserts {
            return Err(StoreError::rejected(StoreOperation::Upsert, "insert failed (injected)"));
        }

        let mut keys = state.existing_keys(table);
        for row in rows {
            if keys.insert(new_key(row)) {
                state.append(table, row);
            }
        }
        Ok(())
    }

    fn insert(&self, table: &str, rows: &[NewDrillingEvent]) -> StoreResult<()> {
        let mut state = self.lock();
        state.insert_calls += 1;
        state.check_insertable(table, rows, StoreOperation::Insert)?;
        for row in rows {
            state.append(table, row);
        }
        Ok(())
    }

    fn insert_one(&self, table: &str, row: &NewDrillingEvent) -> StoreResult<StoredEvent> {
        let mut state = self.lock();
        state.insert_calls += 1;
        state.check_insertable(table, std::slice::from_ref(row), StoreOperation::InsertOne)?;
        Ok(state.append(table, row))
    }
}
