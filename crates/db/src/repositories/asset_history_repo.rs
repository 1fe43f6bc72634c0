//! Repository for the `asset_history` audit trail.

use sqlx::PgPool;

use qm_core::types::{DbId, Timestamp};

use crate::models::asset_history::{AssetHistory, NewHistoryEntry};

const COLUMNS: &str = "\
    id, asset_id, import_id, change_type, field_name, old_value, new_value, \
    changed_at, changed_by";

/// Provides append and lookup operations for the audit trail.
pub struct AssetHistoryRepo;

impl AssetHistoryRepo {
    /// Append one entry inside the caller's transaction.
    pub async fn append(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &NewHistoryEntry<'_>,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO asset_history \
                (asset_id, import_id, change_type, field_name, old_value, new_value, changed_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(entry.asset_id)
        .bind(entry.import_id)
        .bind(entry.change_type.as_str())
        .bind(entry.field_name)
        .bind(entry.old_value)
        .bind(entry.new_value)
        .bind(entry.changed_by)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// History for one asset, newest first.
    pub async fn list_by_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<AssetHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_history \
             WHERE asset_id = $1 \
             ORDER BY changed_at DESC, id DESC"
        );
        sqlx::query_as::<_, AssetHistory>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Every entry an import produced, inside the rollback transaction.
    pub async fn list_by_import(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        import_id: DbId,
    ) -> Result<Vec<AssetHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_history \
             WHERE import_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, AssetHistory>(&query)
            .bind(import_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Whether the asset has any history strictly before the given instant.
    ///
    /// Entries written in the same transaction share a `changed_at`, so
    /// same-import siblings never count as earlier.
    pub async fn has_earlier_entry(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        asset_id: DbId,
        before: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(\
                SELECT 1 FROM asset_history WHERE asset_id = $1 AND changed_at < $2\
             )",
        )
        .bind(asset_id)
        .bind(before)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }

    /// Delete all remaining entries tagged with an import; returns how many.
    pub async fn delete_by_import(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        import_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM asset_history WHERE import_id = $1")
            .bind(import_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
