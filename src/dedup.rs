//! De-duplication of events merged from the remote store.
//!
//! The store is append-mostly and holds true duplicate rows, so identity is the composite
//! [`DedupKey`] (well, depth to the centimeter, subcategory), never the `id`.

use std::collections::HashSet;

use crate::types::DrillingEvent;

/// Composite identity of a drilling event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub well: String,
    /// Depth in hundredths of a meter.
    pub depth_cm: i64,
    pub subcategory: String,
}

/// How wells are compared when building keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupPolicy {
    /// Compare well names case-insensitively (`cgc-101` == `CGC-101`).
    pub case_insensitive_well: bool,
}

impl DedupKey {
    /// Key with exact (trimmed) well comparison.
    pub fn of(event: &DrillingEvent) -> Self {
        Self::with_policy(event, DedupPolicy::default())
    }

    pub fn with_policy(event: &DrillingEvent, policy: DedupPolicy) -> Self {
        let well = event.well.trim();
        Self {
            well: if policy.case_insensitive_well {
                well.to_lowercase()
            } else {
                well.to_string()
            },
            depth_cm: (event.depth * 100.0).round() as i64,
            subcategory: event.subcategory.trim().to_string(),
        }
    }
}

/// Result of a [`Deduplicator::run`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    /// First occurrences, in input order.
    pub unique: Vec<DrillingEvent>,
    /// Number of records discarded as repeats.
    pub duplicates: usize,
}

/// Order-preserving, first-occurrence-wins de-duplicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator {
    policy: DedupPolicy,
}

impl Deduplicator {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }

    /// Keep each record the first time its key is seen.
    pub fn run(&self, records: impl IntoIterator<Item = DrillingEvent>) -> DedupOutcome {
        let mut seen = HashSet::new();
        let mut outcome = DedupOutcome::default();

        for record in records {
            if seen.insert(DedupKey::with_policy(&record, self.policy)) {
                outcome.unique.push(record);
            } else {
                outcome.duplicates += 1;
            }
        }

        outcome
    }
}

/// De-duplicate with the default policy. Stable and idempotent.
pub fn dedupe(records: impl IntoIterator<Item = DrillingEvent>) -> Vec<DrillingEvent> {
    Deduplicator::default().run(records).unique
}
