//! Repository for the `import_records` ledger.

use sqlx::PgPool;

use qm_core::status::ImportStatus;
use qm_core::types::DbId;

use crate::models::import_record::{CommitError, ImportRecord};

const COLUMNS: &str = "\
    id, filename, uploaded_at, uploaded_by, column_mapping, \
    records_processed, records_created, records_updated, records_failed, \
    validation_errors, status, rolled_back_at";

/// How many records `list_recent` returns.
const RECENT_LIMIT: i64 = 50;

/// Provides CRUD for the import ledger.
pub struct ImportRecordRepo;

impl ImportRecordRepo {
    /// Insert a pending record at the start of a commit transaction, so
    /// per-row history entries can reference its ID.
    pub async fn create_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        filename: &str,
        uploaded_by: &str,
        column_mapping: &serde_json::Value,
    ) -> Result<ImportRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_records (filename, uploaded_by, column_mapping, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(filename)
            .bind(uploaded_by)
            .bind(column_mapping)
            .bind(ImportStatus::Pending.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write final counts and flip the record to `completed`.
    pub async fn finalize_completed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        created: i32,
        updated: i32,
        failed: i32,
        errors: &[CommitError],
    ) -> Result<ImportRecord, sqlx::Error> {
        let errors_json =
            serde_json::to_value(errors).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "UPDATE import_records SET \
                records_processed = $2, records_created = $3, records_updated = $4, \
                records_failed = $5, validation_errors = $6, status = $7 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(id)
            .bind(created + updated + failed)
            .bind(created)
            .bind(updated)
            .bind(failed)
            .bind(errors_json)
            .bind(ImportStatus::Completed.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a failed import outside the dead transaction, so the attempt
    /// still shows up in history after everything else rolled back.
    pub async fn create_failed(
        pool: &PgPool,
        filename: &str,
        uploaded_by: &str,
        column_mapping: &serde_json::Value,
        message: &str,
    ) -> Result<ImportRecord, sqlx::Error> {
        let errors = serde_json::json!([{ "row": 0, "message": message }]);
        let query = format!(
            "INSERT INTO import_records \
                (filename, uploaded_by, column_mapping, validation_errors, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(filename)
            .bind(uploaded_by)
            .bind(column_mapping)
            .bind(errors)
            .bind(ImportStatus::Failed.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImportRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_records WHERE id = $1");
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent imports, newest first.
    pub async fn list_recent(pool: &PgPool) -> Result<Vec<ImportRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM import_records \
             ORDER BY uploaded_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(RECENT_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Fetch an import for rollback under a row lock, so two concurrent
    /// rollbacks of the same import serialize.
    pub async fn find_by_id_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<ImportRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_records WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Flip an import to `rolled_back` and stamp when.
    pub async fn mark_rolled_back(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE import_records SET status = $2, rolled_back_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ImportStatus::RolledBack.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
