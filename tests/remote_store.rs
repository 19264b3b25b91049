use std::cell::RefCell;

use drilling_events::dedup::DedupPolicy;
use drilling_events::pipeline::ingest;
use drilling_events::store::{
    EventRepository, EventStore, MemoryStore, StoreConfig, StoredEvent, UNIQUE_COLUMNS,
};
use drilling_events::types::{DrillingEvent, NewDrillingEvent, RawRow};
use drilling_events::{StoreError, StoreResult};

const TABLE: &str = "drilling_events";

fn config() -> StoreConfig {
    StoreConfig::new("mem://test", "key")
}

fn stored(id: usize, well: &str, depth: f64, sub: Option<&str>) -> StoredEvent {
    StoredEvent {
        id: id.to_string(),
        well: well.to_string(),
        depth,
        subcategory: sub.map(str::to_string),
        comment: None,
    }
}

fn distinct_rows(n: usize) -> Vec<StoredEvent> {
    (0..n)
        .map(|i| stored(i, "CGC-101", i as f64, Some("PERFORACION")))
        .collect()
}

fn new_event(well: &str, depth: f64, sub: &str) -> DrillingEvent {
    NewDrillingEvent {
        well: well.to_string(),
        depth,
        subcategory: sub.to_string(),
        comment: String::new(),
    }
    .with_id(format!("local-{well}-{depth}"))
}

/// Serves the same page for every request, like a store ignoring the offset.
struct RepeatingStore {
    page: Vec<StoredEvent>,
    calls: RefCell<usize>,
    max_calls: usize,
}

impl EventStore for RepeatingStore {
    fn fetch_page(&self, _table: &str, _offset: usize, _limit: usize) -> StoreResult<Vec<StoredEvent>> {
        let mut calls = self.calls.borrow_mut();
        *calls += 1;
        if *calls > self.max_calls {
            return Ok(Vec::new());
        }
        Ok(self.page.clone())
    }

    fn upsert(&self, _table: &str, _rows: &[NewDrillingEvent], _conflict: &[&str]) -> StoreResult<()> {
        Ok(())
    }

    fn insert(&self, _table: &str, _rows: &[NewDrillingEvent]) -> StoreResult<()> {
        Ok(())
    }

    fn insert_one(&self, _table: &str, _row: &NewDrillingEvent) -> StoreResult<StoredEvent> {
        Ok(stored(1, "x", 0.0, None))
    }
}

/// Serves pages decoded from JSON bodies, like a REST transport would.
struct JsonPageStore {
    pages: Vec<&'static str>,
}

impl EventStore for JsonPageStore {
    fn fetch_page(&self, _table: &str, offset: usize, limit: usize) -> StoreResult<Vec<StoredEvent>> {
        let body = self.pages.get(offset / limit).copied().unwrap_or("[]");
        Ok(serde_json::from_str(body).expect("page body"))
    }

    fn upsert(&self, _table: &str, _rows: &[NewDrillingEvent], _conflict: &[&str]) -> StoreResult<()> {
        Ok(())
    }

    fn insert(&self, _table: &str, _rows: &[NewDrillingEvent]) -> StoreResult<()> {
        Ok(())
    }

    fn insert_one(&self, _table: &str, _row: &NewDrillingEvent) -> StoreResult<StoredEvent> {
        Ok(stored(1, "x", 0.0, None))
    }
}

#[test]
fn loosely_typed_rows_do_not_abort_the_load() {
    let store = JsonPageStore {
        pages: vec![
            r#"[{"id":1,"pozo":"CGC-101","prof_desde":"1500.5","subcategoria_npt":"CLIMA"},
                {"id":2,"pozo":null,"prof_desde":20}]"#,
            r#"[{"id":"3","pozo":"CGC-205","prof_desde":"sin dato"}]"#,
        ],
    };
    let repo = EventRepository::new(store, config().with_page_size(2)).unwrap();

    let report = repo.fetch_all().unwrap();
    assert_eq!(report.fetched_rows, 3);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].depth, 1500.5);
    assert_eq!(report.events[0].well, "CGC-101");
}

#[test]
fn identical_pages_collapse_to_one_page_of_events() {
    let page = distinct_rows(3);
    let store = RepeatingStore {
        page: page.clone(),
        calls: RefCell::new(0),
        max_calls: 2,
    };
    let repo = EventRepository::new(store, config().with_page_size(3)).unwrap();

    let report = repo.fetch_all().unwrap();
    assert_eq!(report.fetched_rows, 6);
    assert_eq!(report.pages, 3);
    assert_eq!(report.duplicates, 3);
    assert_eq!(
        report.events.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["0", "1", "2"]
    );
}

#[test]
fn stops_on_short_page() {
    let store = MemoryStore::new().with_rows(TABLE, distinct_rows(5));
    let repo = EventRepository::new(&store, config().with_page_size(2)).unwrap();

    let report = repo.fetch_all().unwrap();
    assert_eq!(report.events.len(), 5);
    assert_eq!(report.pages, 3);
    assert!(!report.capped);
    assert_eq!(store.fetch_calls(), vec![(0, 2), (2, 2), (4, 2)]);
}

#[test]
fn stops_on_empty_page_when_rows_fill_pages_exactly() {
    let store = MemoryStore::new().with_rows(TABLE, distinct_rows(4));
    let repo = EventRepository::new(&store, config().with_page_size(2)).unwrap();

    let report = repo.fetch_all().unwrap();
    assert_eq!(report.events.len(), 4);
    assert_eq!(store.fetch_calls(), vec![(0, 2), (2, 2), (4, 2)]);
}

#[test]
fn empty_store_loads_nothing() {
    let store = MemoryStore::new();
    let repo = EventRepository::new(&store, config()).unwrap();

    let report = repo.fetch_all().unwrap();
    assert!(report.events.is_empty());
    assert_eq!(report.pages, 1);
    assert_eq!(store.fetch_calls(), vec![(0, 1_000)]);
}

#[test]
fn safety_cap_truncates_accumulated_rows() {
    let store = MemoryStore::new().with_rows(TABLE, distinct_rows(10));
    let repo = EventRepository::new(&store, config().with_page_size(4).with_max_rows(6)).unwrap();

    let report = repo.fetch_all().unwrap();
    assert!(report.capped);
    assert_eq!(report.fetched_rows, 6);
    assert_eq!(report.events.len(), 6);
    assert_eq!(report.pages, 2);
    assert_eq!(report.events.last().unwrap().depth, 5.0);
}

#[test]
fn page_failure_aborts_the_whole_load() {
    let store = MemoryStore::new()
        .with_rows(TABLE, distinct_rows(5))
        .fail_fetch_at(2);
    let repo = EventRepository::new(&store, config().with_page_size(2)).unwrap();

    let err = repo.fetch_all().unwrap_err();
    match &err {
        StoreError::PageFetch { offset, limit, .. } => {
            assert_eq!((*offset, *limit), (2, 2));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(store.fetch_calls().len(), 2);
}

#[test]
fn store_rows_are_normalized_and_invalid_ones_dropped() {
    let store = MemoryStore::new().with_rows(
        TABLE,
        vec![
            stored(1, " CGC-101 ", 100.0, None),
            stored(2, "CGC-101", 100.0, Some("Evento")),
            stored(3, "", 50.0, Some("CLIMA")),
            stored(4, "CGC-205", -1.0, Some("CLIMA")),
        ],
    );
    let repo = EventRepository::new(&store, config()).unwrap();

    let report = repo.fetch_all().unwrap();
    assert_eq!(report.fetched_rows, 4);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].id, "1");
    assert_eq!(report.events[0].well, "CGC-101");
    assert_eq!(report.events[0].subcategory, "Evento");
}

#[test]
fn case_insensitive_policy_merges_well_spellings() {
    let rows = vec![
        stored(1, "CGC-101", 10.0, Some("CLIMA")),
        stored(2, "cgc-101", 10.0, Some("CLIMA")),
    ];

    let store = MemoryStore::new().with_rows(TABLE, rows);
    let exact = EventRepository::new(&store, config()).unwrap();
    assert_eq!(exact.fetch_all().unwrap().events.len(), 2);

    let folded = EventRepository::new(&store, config())
        .unwrap()
        .with_dedup_policy(DedupPolicy {
            case_insensitive_well: true,
        });
    assert_eq!(folded.fetch_all().unwrap().events.len(), 1);
}

#[test]
fn upload_uses_upsert_when_constraint_exists() {
    let store = MemoryStore::new().with_unique_constraint();
    let repo = EventRepository::new(&store, config()).unwrap();
    let events = vec![new_event("CGC-101", 10.0, "CLIMA"), new_event("CGC-101", 10.0, "CLIMA")];

    let outcome = repo.upload(&events).unwrap();
    assert_eq!(outcome.rows, 2);
    assert!(!outcome.used_fallback);
    assert!(outcome.upsert_error.is_none());
    assert_eq!(store.rows(TABLE).len(), 1);

    // Re-uploading the same sheet adds nothing.
    repo.upload(&events).unwrap();
    assert_eq!(store.rows(TABLE).len(), 1);
    assert_eq!(store.insert_calls(), 0);
}

#[test]
fn upload_falls_back_to_insert_without_constraint() {
    let store = MemoryStore::new();
    let repo = EventRepository::new(&store, config()).unwrap();
    let events = vec![new_event("CGC-101", 10.0, "CLIMA"), new_event("CGC-101", 10.0, "CLIMA")];

    let outcome = repo.upload(&events).unwrap();
    assert!(outcome.used_fallback);
    assert!(outcome.upsert_error.unwrap().contains("ON CONFLICT"));
    assert_eq!(store.upsert_calls(), 1);
    assert_eq!(store.insert_calls(), 1);

    // Duplicates land in the store but reads mask them.
    assert_eq!(store.rows(TABLE).len(), 2);
    let loaded = repo.fetch_all().unwrap();
    assert_eq!(loaded.events.len(), 1);
    assert_eq!(loaded.duplicates, 1);
}

#[test]
fn upload_sends_no_local_ids() {
    let store = MemoryStore::new();
    let repo = EventRepository::new(&store, config()).unwrap();
    repo.upload(&[new_event("CGC-101", 10.0, "CLIMA")]).unwrap();

    let rows = store.rows(TABLE);
    assert_eq!(rows[0].id, "1");
    assert_ne!(rows[0].id, "local-CGC-101-10");
}

#[test]
fn both_writes_failing_reports_both_messages() {
    let store = MemoryStore::new().fail_inserts();
    let repo = EventRepository::new(&store, config()).unwrap();

    let err = repo.upload(&[new_event("CGC-101", 10.0, "CLIMA")]).unwrap_err();
    match err {
        StoreError::WriteFailed { upsert, insert } => {
            assert!(upsert.contains("ON CONFLICT"));
            assert!(insert.contains("insert failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.rows(TABLE).is_empty());
}

#[test]
fn create_returns_store_assigned_id() {
    let store = MemoryStore::new().with_rows(TABLE, distinct_rows(2));
    let repo = EventRepository::new(&store, config()).unwrap();

    let created = repo
        .create(&NewDrillingEvent {
            well: "YPF-7".to_string(),
            depth: 1250.0,
            subcategory: "ESPERA".to_string(),
            comment: "cargado a mano".to_string(),
        })
        .unwrap();
    // Seeded ids are 0 and 1.
    assert_eq!(created.id, "2");
    assert_eq!(created.well, "YPF-7");
    assert_eq!(created.comment, "cargado a mano");

    let loaded = repo.fetch_all().unwrap();
    assert_eq!(loaded.events.len(), 3);
    assert_eq!(loaded.events.last().unwrap().well, "YPF-7");
}

#[test]
fn create_failure_is_an_error() {
    let store = MemoryStore::new().fail_inserts();
    let repo = EventRepository::new(&store, config()).unwrap();
    let evt = new_event("YPF-7", 1.0, "ESPERA").to_new();
    assert!(repo.create(&evt).is_err());
}

#[test]
fn sheet_to_store_round_trip() {
    let rows = vec![
        RawRow::new()
            .with("pozo", "CGC-101")
            .with("prof_desde", "2,900.00")
            .with("subcategoria_npt", "PERFORACION"),
        RawRow::new()
            .with("pozo", "CGC-101")
            .with("prof_desde", 2900.0)
            .with("subcategoria_npt", " PERFORACION "),
        RawRow::new().with("pozo", "YPF-7").with("prof_desde", "1500 m"),
    ];
    let report = ingest(&rows);
    assert_eq!(report.events.len(), 3);

    let store = MemoryStore::new();
    let repo = EventRepository::new(&store, config()).unwrap();
    repo.upload(&report.events).unwrap();

    let loaded = repo.fetch_all().unwrap();
    assert_eq!(loaded.fetched_rows, 3);
    assert_eq!(loaded.events.len(), 2);
    assert_eq!(loaded.events[0].well, "YPF-7");
    assert_eq!(loaded.events[1].depth, 2900.0);
    assert_eq!(UNIQUE_COLUMNS, ["pozo", "prof_desde", "subcategoria_npt"]);
}
