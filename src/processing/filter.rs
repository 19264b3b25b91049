//! Event selection by well and subcategory.

use std::collections::BTreeSet;

use crate::types::DrillingEvent;

/// Selection of wells and subcategories to display.
///
/// An event passes when its well is selected and, if any subcategory is selected, its
/// subcategory is one of them. No selected wells means nothing passes; no selected subcategories
/// means every subcategory passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    wells: BTreeSet<String>,
    subcategories: BTreeSet<String>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter with every well present in `events` selected.
    pub fn all_wells(events: &[DrillingEvent]) -> Self {
        Self {
            wells: events.iter().map(|e| e.well.clone()).collect(),
            subcategories: BTreeSet::new(),
        }
    }

    pub fn with_wells<I, S>(mut self, wells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wells.extend(wells.into_iter().map(Into::into));
        self
    }

    pub fn with_subcategories<I, S>(mut self, subcategories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories
            .extend(subcategories.into_iter().map(Into::into));
        self
    }

    /// Flip a well in or out of the selection. Returns whether it is now selected.
    pub fn toggle_well(&mut self, well: &str) -> bool {
        toggle(&mut self.wells, well)
    }

    /// Flip a subcategory in or out of the selection. Returns whether it is now selected.
    pub fn toggle_subcategory(&mut self, subcategory: &str) -> bool {
        toggle(&mut self.subcategories, subcategory)
    }

    pub fn clear_subcategories(&mut self) {
        self.subcategories.clear();
    }

    /// Selected wells, sorted.
    pub fn wells(&self) -> impl Iterator<Item = &str> {
        self.wells.iter().map(String::as_str)
    }

    pub fn subcategories(&self) -> impl Iterator<Item = &str> {
        self.subcategories.iter().map(String::as_str)
    }

    pub fn matches(&self, event: &DrillingEvent) -> bool {
        self.wells.contains(&event.well)
            && (self.subcategories.is_empty() || self.subcategories.contains(&event.subcategory))
    }

    /// Events passing the filter, in input order.
    pub fn apply<'a>(&self, events: &'a [DrillingEvent]) -> Vec<&'a DrillingEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) -> bool {
    if set.remove(value) {
        false
    } else {
        set.insert(value.to_string());
        true
    }
}
