//! Aggregations over event collections.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::DrillingEvent;

/// Distinct well names, sorted.
pub fn available_wells(events: &[DrillingEvent]) -> Vec<String> {
    sorted_unique(events.iter().map(|e| e.well.as_str()))
}

/// Distinct subcategories, sorted.
pub fn available_subcategories(events: &[DrillingEvent]) -> Vec<String> {
    sorted_unique(events.iter().map(|e| e.subcategory.as_str()))
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Wells whose name contains `term`, ignoring case. A blank term returns every well.
pub fn search_wells<'a>(wells: &'a [String], term: &str) -> Vec<&'a str> {
    let needle = term.trim().to_lowercase();
    wells
        .iter()
        .map(String::as_str)
        .filter(|w| needle.is_empty() || w.to_lowercase().contains(&needle))
        .collect()
}

/// Number of events per subcategory, keyed in sorted order.
pub fn count_by_subcategory<'a, I>(events: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a DrillingEvent>,
{
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.subcategory.clone()).or_insert(0) += 1;
    }
    counts
}

/// `(min, max)` depth, or `None` for an empty collection.
pub fn depth_range<'a, I>(events: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a DrillingEvent>,
{
    events.into_iter().fold(None, |acc, e| match acc {
        None => Some((e.depth, e.depth)),
        Some((lo, hi)) => Some((lo.min(e.depth), hi.max(e.depth))),
    })
}

/// Events of one well, ordered by depth.
#[derive(Debug, Clone, PartialEq)]
pub struct WellSummary {
    pub well: String,
    pub events: Vec<DrillingEvent>,
    pub max_depth: f64,
}

/// Group events per well (wells sorted, events by ascending depth, ties in input order).
pub fn group_by_well<'a, I>(events: I) -> Vec<WellSummary>
where
    I: IntoIterator<Item = &'a DrillingEvent>,
{
    let mut groups: BTreeMap<&str, Vec<DrillingEvent>> = BTreeMap::new();
    for event in events {
        groups.entry(event.well.as_str()).or_default().push(event.clone());
    }

    groups
        .into_iter()
        .map(|(well, mut events)| {
            events.sort_by(|a, b| a.depth.total_cmp(&b.depth));
            let max_depth = events.last().map(|e| e.depth).unwrap_or(0.0);
            WellSummary {
                well: well.to_string(),
                events,
                max_depth,
            }
        })
        .collect()
}
