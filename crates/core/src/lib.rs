//! Pure logic for the spreadsheet import reconciliation pipeline.
//!
//! This crate has no database, async, or I/O dependencies. It provides:
//!
//! - Shared id/timestamp aliases and the core error type
//! - Status and change-kind enums with string conversions
//! - The canonical asset record produced by the row transformer
//! - Column auto-mapping from spreadsheet headers
//! - Field normalizers (departments, statuses, tags, notes)
//! - Batch validation and delta detection against a catalog snapshot

pub mod delta;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod record;
pub mod status;
pub mod transform;
pub mod types;
pub mod validate;

pub use error::{CoreError, CoreResult};
pub use types::{DbId, Timestamp};
