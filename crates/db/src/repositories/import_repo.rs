//! The import committer and rollback engine.
//!
//! `commit_batch` applies a validated batch inside one transaction: either
//! the catalog reflects the whole import (with per-row failures recorded on
//! the import record) or nothing changed and a `failed` record is left
//! behind. `rollback` undoes a committed import by deleting the assets it
//! created; assets it merely updated keep their current values and are
//! reported as not reverted.

use sqlx::{Acquire, PgPool};
use tracing::warn;

use qm_core::mapping::ColumnMapping;
use qm_core::record::AssetRecord;
use qm_core::status::{ChangeKind, ImportStatus};
use qm_core::types::DbId;

use crate::models::asset_history::NewHistoryEntry;
use crate::models::import_record::{CommitError, ImportRecord, RollbackOutcome};
use crate::repositories::{AssetHistoryRepo, AssetRepo, ImportRecordRepo};

/// Outcome of applying one row to the catalog.
enum RowOutcome {
    Created,
    Updated,
}

/// Orchestrates transactional import commit and rollback.
pub struct ImportRepo;

impl ImportRepo {
    /// Commit a transformed batch under a single transaction.
    ///
    /// Per-row failures (missing tag, constraint violations) are absorbed
    /// into savepoints and recorded on the returned import record. A failure
    /// outside any row — starting the transaction, finalizing counts — rolls
    /// everything back, inserts a `failed` import record, and returns the
    /// error.
    pub async fn commit_batch(
        pool: &PgPool,
        filename: &str,
        mapping: &ColumnMapping,
        records: &[AssetRecord],
        uploaded_by: &str,
    ) -> Result<ImportRecord, sqlx::Error> {
        let mapping_json =
            serde_json::to_value(mapping).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = pool.begin().await?;
        match Self::commit_in_tx(&mut tx, filename, &mapping_json, records, uploaded_by).await {
            Ok(record) => {
                tx.commit().await?;
                Ok(record)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "import transaction rollback failed");
                }
                if let Err(record_err) = ImportRecordRepo::create_failed(
                    pool,
                    filename,
                    uploaded_by,
                    &mapping_json,
                    &err.to_string(),
                )
                .await
                {
                    warn!(error = %record_err, filename, "could not record failed import");
                }
                Err(err)
            }
        }
    }

    async fn commit_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        filename: &str,
        mapping_json: &serde_json::Value,
        records: &[AssetRecord],
        uploaded_by: &str,
    ) -> Result<ImportRecord, sqlx::Error> {
        // Pending record first so per-row history can reference its ID.
        let pending =
            ImportRecordRepo::create_pending(tx, filename, uploaded_by, mapping_json).await?;

        let mut created = 0i32;
        let mut updated = 0i32;
        let mut errors: Vec<CommitError> = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let Some(tag) = record.asset_tag.as_deref() else {
                errors.push(CommitError {
                    row,
                    message: "missing asset tag".to_string(),
                });
                continue;
            };

            // Savepoint per row: a constraint violation here must not poison
            // the rest of the batch.
            let mut savepoint = tx.begin().await?;
            match Self::apply_row(&mut savepoint, pending.id, tag, record, uploaded_by).await {
                Ok(outcome) => {
                    savepoint.commit().await?;
                    match outcome {
                        RowOutcome::Created => created += 1,
                        RowOutcome::Updated => updated += 1,
                    }
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    errors.push(CommitError {
                        row,
                        message: err.to_string(),
                    });
                }
            }
        }

        let failed = errors.len() as i32;
        ImportRecordRepo::finalize_completed(tx, pending.id, created, updated, failed, &errors)
            .await
    }

    /// Upsert one row keyed on the asset tag, with its history entry.
    async fn apply_row(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        import_id: DbId,
        tag: &str,
        record: &AssetRecord,
        uploaded_by: &str,
    ) -> Result<RowOutcome, sqlx::Error> {
        // Lock the existing row (if any) so concurrent imports of the same
        // tag serialize; a racing insert surfaces as a unique violation and
        // fails just this row.
        match AssetRepo::find_id_by_tag_for_update(tx, tag).await? {
            Some(asset_id) => {
                AssetRepo::overwrite_from_record(tx, asset_id, record).await?;
                AssetHistoryRepo::append(
                    tx,
                    &NewHistoryEntry {
                        asset_id,
                        import_id: Some(import_id),
                        change_type: ChangeKind::Import,
                        field_name: Some("import"),
                        old_value: None,
                        new_value: None,
                        changed_by: uploaded_by,
                    },
                )
                .await?;
                Ok(RowOutcome::Updated)
            }
            None => {
                let asset = AssetRepo::insert_from_record(tx, record).await?;
                AssetHistoryRepo::append(
                    tx,
                    &NewHistoryEntry {
                        asset_id: asset.id,
                        import_id: Some(import_id),
                        change_type: ChangeKind::Import,
                        field_name: Some("created"),
                        old_value: None,
                        new_value: None,
                        changed_by: uploaded_by,
                    },
                )
                .await?;
                Ok(RowOutcome::Created)
            }
        }
    }

    /// Undo a committed import. Returns `None` when the import does not
    /// exist or was already rolled back.
    ///
    /// Assets whose only history is this import are deleted (their history
    /// cascades with them). Assets that existed before — anything with a
    /// strictly earlier history entry — are left as-is and counted in
    /// `updates_not_reverted`.
    pub async fn rollback(
        pool: &PgPool,
        import_id: DbId,
    ) -> Result<Option<RollbackOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(record) = ImportRecordRepo::find_by_id_for_update(&mut tx, import_id).await?
        else {
            return Ok(None);
        };
        if record.status == ImportStatus::RolledBack.as_str() {
            return Ok(None);
        }

        let entries = AssetHistoryRepo::list_by_import(&mut tx, import_id).await?;
        let history_entries_deleted = entries.len() as i64;

        let mut assets_deleted = 0i64;
        let mut updates_not_reverted = 0i64;
        for entry in entries
            .iter()
            .filter(|e| e.change_type == ChangeKind::Import.as_str())
        {
            // Entries written in this import's transaction share a changed_at,
            // so "strictly earlier" means a different change altogether.
            let predates =
                AssetHistoryRepo::has_earlier_entry(&mut tx, entry.asset_id, entry.changed_at)
                    .await?;
            if predates {
                updates_not_reverted += 1;
            } else if AssetRepo::delete_in_tx(&mut tx, entry.asset_id).await? {
                assets_deleted += 1;
            }
        }

        // Entries for deleted assets cascaded already; this clears the rest.
        AssetHistoryRepo::delete_by_import(&mut tx, import_id).await?;
        ImportRecordRepo::mark_rolled_back(&mut tx, import_id).await?;
        tx.commit().await?;

        Ok(Some(RollbackOutcome {
            import_id,
            assets_deleted,
            updates_not_reverted,
            history_entries_deleted,
        }))
    }
}
