//! Audit trail models.
//!
//! History rows are immutable once written. The import path records only a
//! marker in `field_name` ('created' or 'import'); direct edits record one
//! row per changed field with old/new values.

use serde::Serialize;
use sqlx::FromRow;

use qm_core::status::ChangeKind;
use qm_core::types::{DbId, Timestamp};

/// A row from the `asset_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetHistory {
    pub id: DbId,
    pub asset_id: DbId,
    /// Import that produced this entry; `None` for direct edits and for
    /// entries whose import record was later removed.
    pub import_id: Option<DbId>,
    pub change_type: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_at: Timestamp,
    pub changed_by: Option<String>,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry<'a> {
    pub asset_id: DbId,
    pub import_id: Option<DbId>,
    pub change_type: ChangeKind,
    pub field_name: Option<&'a str>,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub changed_by: &'a str,
}
