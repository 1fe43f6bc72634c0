//! Import history models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qm_core::types::{DbId, Timestamp};

/// A row from the `import_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRecord {
    pub id: DbId,
    pub filename: String,
    pub uploaded_at: Timestamp,
    pub uploaded_by: String,
    /// The accepted column mapping, serialized as JSON.
    pub column_mapping: serde_json::Value,
    pub records_processed: i32,
    pub records_created: i32,
    pub records_updated: i32,
    pub records_failed: i32,
    /// Per-row commit errors, serialized as a JSON array of [`CommitError`].
    pub validation_errors: serde_json::Value,
    pub status: String,
    pub rolled_back_at: Option<Timestamp>,
}

/// One per-row failure captured during commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitError {
    /// 1-based row number, matching what a person sees in the sheet.
    pub row: usize,
    pub message: String,
}

/// What the rollback engine managed (and failed) to undo.
///
/// Rollback deletes assets this import created but cannot restore field
/// values on assets it merely updated; the non-reverted remainder is
/// reported instead of hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollbackOutcome {
    pub import_id: DbId,
    pub assets_deleted: i64,
    pub updates_not_reverted: i64,
    pub history_entries_deleted: i64,
}
