//! The canonical asset record produced by the row transformer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw spreadsheet row: column header to cell text.
///
/// Blank cells are absent from the map, so `get` returning `None` means
/// "nothing in that column".
pub type RawRow = HashMap<String, String>;

/// A spreadsheet row after column mapping and normalization.
///
/// Every mappable field is present as a definite `Option`: `None` means the
/// source column was unmapped or the cell was blank, and the committer
/// overwrites existing assets with exactly these values (tag excepted).
/// `status` is a plain string so that downstream validation can still flag a
/// non-canonical value instead of making one unrepresentable; the transformer
/// only ever emits the five canonical statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Cleaned natural key (trimmed, uppercased). `None` when the row has no
    /// usable tag; such rows are counted as failed by the committer.
    pub asset_tag: Option<String>,
    pub computer_name: Option<String>,
    pub serial_number: Option<String>,
    pub department: Option<String>,
    pub assigned_user_name: Option<String>,
    pub assigned_user_id: Option<String>,
    pub operating_system: Option<String>,
    pub notes: Option<String>,
    /// Always one of the five canonical statuses when produced by
    /// [`crate::transform::transform_row`].
    pub status: String,
}

impl AssetRecord {
    /// Value of a monitored field by canonical name, with blank values
    /// collapsed to `None` (the comparison sentinel used by delta detection).
    ///
    /// Returns `None` for field names outside the record.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "asset_tag" => self.asset_tag.as_deref(),
            "computer_name" => self.computer_name.as_deref(),
            "serial_number" => self.serial_number.as_deref(),
            "department" => self.department.as_deref(),
            "assigned_user_name" => self.assigned_user_name.as_deref(),
            "assigned_user_id" => self.assigned_user_id.as_deref(),
            "operating_system" => self.operating_system.as_deref(),
            "notes" => self.notes.as_deref(),
            "status" => Some(self.status.as_str()),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}
