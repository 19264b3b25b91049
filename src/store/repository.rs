use tracing::{debug, error, info, warn};

use crate::dedup::{DedupPolicy, Deduplicator};
use crate::error::{StoreError, StoreOperation, StoreResult};
use crate::types::{DEFAULT_SUBCATEGORY, DrillingEvent, NewDrillingEvent};

use super::{EventStore, StoreConfig, UNIQUE_COLUMNS};

/// Result of [`EventRepository::fetch_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    /// Unique events, in store order (depth ascending), first occurrence kept.
    pub events: Vec<DrillingEvent>,
    /// Rows received across all pages (after any truncation to the cap).
    pub fetched_rows: usize,
    /// Page requests issued.
    pub pages: usize,
    /// Rows discarded as duplicates.
    pub duplicates: usize,
    /// Rows dropped because they cannot form a valid event (blank well, negative depth).
    pub dropped: usize,
    /// The load stopped at [`StoreConfig::max_rows`] rather than at the end of the data.
    pub capped: bool,
}

/// Result of [`EventRepository::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows sent to the store.
    pub rows: usize,
    /// The upsert was rejected and rows were written with a plain insert. Duplicates may now
    /// exist in the store; reads mask them.
    pub used_fallback: bool,
    /// Why the upsert was rejected, when the fallback ran.
    pub upsert_error: Option<String>,
}

/// Client handle over an [`EventStore`].
#[derive(Debug)]
pub struct EventRepository<S> {
    store: S,
    config: StoreConfig,
    dedup: Deduplicator,
}

impl<S: EventStore> EventRepository<S> {
    /// Create a repository after validating `config`.
    pub fn new(store: S, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            dedup: Deduplicator::default(),
        })
    }

    /// Use a non-default de-duplication policy for [`Self::fetch_all`].
    pub fn with_dedup_policy(mut self, policy: DedupPolicy) -> Self {
        self.dedup = Deduplicator::new(policy);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every event from the store and de-duplicate the merged pages.
    ///
    /// Pages are requested strictly one after another. The load ends on an empty page, a page
    /// shorter than `page_size`, or once `max_rows` rows have accumulated (extra rows are cut).
    /// Any page failure aborts the whole load; nothing partial is returned.
    pub fn fetch_all(&self) -> StoreResult<FetchReport> {
        let table = self.config.table.as_str();
        let limit = self.config.page_size;
        let cap = self.config.max_rows;

        let mut rows = Vec::new();
        let mut pages = 0;
        let mut capped = false;
        loop {
            let offset = pages * limit;
            let page = self.store.fetch_page(table, offset, limit).map_err(|e| {
                error!(table, offset, limit, error = %e, "page fetch failed; aborting load");
                StoreError::PageFetch {
                    offset,
                    limit,
                    source: Box::new(e),
                }
            })?;
            pages += 1;

            let len = page.len();
            debug!(table, page = pages, offset, rows = len, "fetched page");
            rows.extend(page);

            if rows.len() >= cap {
                if rows.len() > cap || len == limit {
                    warn!(table, cap, "row safety cap reached; stopping paginated load");
                    capped = true;
                }
                rows.truncate(cap);
                break;
            }
            if len < limit {
                break;
            }
        }

        let fetched_rows = rows.len();
        let events: Vec<DrillingEvent> = rows
            .into_iter()
            .filter_map(|row| row.into_event(DEFAULT_SUBCATEGORY))
            .collect();
        let dropped = fetched_rows - events.len();
        if dropped > 0 {
            warn!(table, dropped, "dropped store rows that cannot form a valid event");
        }

        let outcome = self.dedup.run(events);
        info!(
            table,
            fetched = fetched_rows,
            unique = outcome.unique.len(),
            pages,
            "loaded events from store"
        );

        Ok(FetchReport {
            events: outcome.unique,
            fetched_rows,
            pages,
            duplicates: outcome.duplicates,
            dropped,
            capped,
        })
    }

    /// Write a batch of events, preferring an upsert on the uniqueness constraint.
    ///
    /// If the store rejects the upsert (typically because the constraint does not exist), the
    /// rows are written with a plain insert instead and [`WriteOutcome::used_fallback`] is set.
    /// Local ids are not sent; the store assigns its own. An empty batch is a no-op.
    pub fn upload(&self, events: &[DrillingEvent]) -> StoreResult<WriteOutcome> {
        if events.is_empty() {
            return Ok(WriteOutcome {
                rows: 0,
                used_fallback: false,
                upsert_error: None,
            });
        }

        let table = self.config.table.as_str();
        let payload: Vec<NewDrillingEvent> = events.iter().map(DrillingEvent::to_new).collect();

        let upsert_err = match self.store.upsert(table, &payload, &UNIQUE_COLUMNS) {
            Ok(()) => {
                info!(table, rows = payload.len(), "upserted events");
                return Ok(WriteOutcome {
                    rows: payload.len(),
                    used_fallback: false,
                    upsert_error: None,
                });
            }
            Err(e) => e,
        };

        warn!(
            table,
            error = %upsert_err,
            "upsert rejected (uniqueness constraint missing?); falling back to plain insert"
        );
        if let Err(insert_err) = self.store.insert(table, &payload) {
            error!(table, error = %insert_err, "insert fallback failed");
            return Err(StoreError::WriteFailed {
                upsert: upsert_err.to_string(),
                insert: insert_err.to_string(),
            });
        }
        info!(table, rows = payload.len(), "inserted events via fallback");

        Ok(WriteOutcome {
            rows: payload.len(),
            used_fallback: true,
            upsert_error: Some(upsert_err.to_string()),
        })
    }

    /// Store a single manually entered event and return it with its store-assigned id.
    pub fn create(&self, event: &NewDrillingEvent) -> StoreResult<DrillingEvent> {
        let table = self.config.table.as_str();
        let stored = self.store.insert_one(table, event)?;
        let id = stored.id.clone();
        stored.into_event(DEFAULT_SUBCATEGORY).ok_or_else(|| {
            StoreError::rejected(
                StoreOperation::InsertOne,
                format!("store returned an invalid row for id {id}"),
            )
        })
    }
}
