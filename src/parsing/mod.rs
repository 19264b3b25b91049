//! Turning raw sheet rows into canonical events.
//!
//! - [`number`]: locale/unit-tolerant depth normalization
//! - [`columns`]: synonym-based header resolution
//! - [`record`]: per-row event construction

pub mod columns;
pub mod number;
pub mod record;

pub use columns::{resolve_field, FieldMapping, FieldSpec, FieldSpecs, LogicalField};
pub use number::{normalize_depth, normalize_depth_str};
pub use record::{build_record, RecordBuilder, RejectReason, RowRejection};
