//! Queries over ingested or fetched events.
//!
//! - [`EventFilter`]: selection by well and subcategory
//! - [`available_wells`] / [`available_subcategories`]: sorted distinct values
//! - [`search_wells`]: case-insensitive well search
//! - [`count_by_subcategory`], [`depth_range`], [`group_by_well`]: summaries
//!
//! ## Example
//!
//! ```rust
//! use drilling_events::processing::{available_wells, count_by_subcategory, EventFilter};
//! use drilling_events::types::DrillingEvent;
//!
//! let evt = |id: &str, well: &str, sub: &str| DrillingEvent {
//!     id: id.to_string(),
//!     well: well.to_string(),
//!     depth: 1000.0,
//!     subcategory: sub.to_string(),
//!     comment: String::new(),
//! };
//! let events = vec![evt("1", "A", "CLIMA"), evt("2", "B", "CLIMA"), evt("3", "B", "ESPERA")];
//!
//! assert_eq!(available_wells(&events), vec!["A", "B"]);
//!
//! let filter = EventFilter::new().with_wells(["B"]);
//! let visible = filter.apply(&events);
//! let counts = count_by_subcategory(visible);
//! assert_eq!(counts["CLIMA"], 1);
//! assert_eq!(counts["ESPERA"], 1);
//! ```

pub mod filter;
pub mod summary;

pub use filter::EventFilter;
pub use summary::{
    available_subcategories, available_wells, count_by_subcategory, depth_range, group_by_well, search_wells,
    WellSummary,
};
