//! Repository for the `assets` table.
//!
//! Catalog queries plus the row-level pieces the import committer composes
//! inside its transaction: a `FOR UPDATE` existence check keyed on the
//! natural tag, insert-from-record, and overwrite-from-record.

use sqlx::PgPool;

use qm_core::delta::MONITORED_FIELDS;
use qm_core::record::AssetRecord;
use qm_core::status::{AssetStatus, ChangeKind};
use qm_core::types::DbId;

use crate::models::asset::{
    Asset, AssetPage, AssetSearchParams, AssetStats, DepartmentCount, UpdateAsset,
};
use crate::models::asset_history::NewHistoryEntry;
use crate::repositories::AssetHistoryRepo;

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, asset_tag, computer_name, serial_number, device_type, make, model, \
    operating_system, specs, purchase_date, warranty_expiration, refresh_due_date, \
    status, assigned_user_name, assigned_user_id, department, cost_center, \
    location_building, location_floor, location_room, notes, \
    created_at, updated_at, last_verified_at, last_verified_by";

/// Columns callers may sort by. Unknown values fall back to `asset_tag`.
const SORTABLE_COLUMNS: &[&str] = &[
    "asset_tag",
    "computer_name",
    "department",
    "status",
    "assigned_user_name",
    "purchase_date",
    "refresh_due_date",
    "created_at",
    "updated_at",
];

/// Default page size for asset listing.
const DEFAULT_PER_PAGE: i64 = 50;

/// Maximum page size for asset listing.
const MAX_PER_PAGE: i64 = 100;

/// Lookahead window for the due-for-refresh count.
const REFRESH_WINDOW_DAYS: i64 = 90;

/// Provides catalog queries and upsert primitives for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by its natural tag.
    pub async fn find_by_tag(pool: &PgPool, tag: &str) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE asset_tag = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    /// All existing tags, for validation against the catalog.
    pub async fn list_tags(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT asset_tag FROM assets")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(tag,)| tag).collect())
    }

    /// Every catalog row, for the delta detector's snapshot.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets ORDER BY asset_tag");
        sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await
    }

    /// List assets with filters, sorting, and pagination.
    pub async fn search(
        pool: &PgPool,
        params: &AssetSearchParams,
    ) -> Result<AssetPage, sqlx::Error> {
        let per_page = params
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = params.page.unwrap_or(1).max(1);
        let offset = (page - 1) * per_page;

        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if params.search.is_some() {
            conditions.push(format!(
                "(asset_tag ILIKE ${bind_idx} OR computer_name ILIKE ${bind_idx} \
                 OR assigned_user_name ILIKE ${bind_idx} OR serial_number ILIKE ${bind_idx} \
                 OR department ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.department.is_some() {
            conditions.push(format!("department = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sort_by = params
            .sort_by
            .as_deref()
            .filter(|c| SORTABLE_COLUMNS.contains(c))
            .unwrap_or("asset_tag");
        let sort_dir = match params.sort_dir.as_deref() {
            Some("desc") => "DESC",
            _ => "ASC",
        };

        let count_query = format!("SELECT COUNT(*) FROM assets {where_clause}");
        let list_query = format!(
            "SELECT {COLUMNS} FROM assets {where_clause} \
             ORDER BY {sort_by} {sort_dir} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_query);
        let mut list_q = sqlx::query_as::<_, Asset>(&list_query);

        // Bind dynamic parameters in order.
        if let Some(ref search) = params.search {
            let pattern = format!("%{search}%");
            count_q = count_q.bind(pattern.clone());
            list_q = list_q.bind(pattern);
        }
        if let Some(ref status) = params.status {
            count_q = count_q.bind(status);
            list_q = list_q.bind(status);
        }
        if let Some(ref department) = params.department {
            count_q = count_q.bind(department);
            list_q = list_q.bind(department);
        }

        let (total,) = count_q.fetch_one(pool).await?;
        let items = list_q.bind(per_page).bind(offset).fetch_all(pool).await?;

        Ok(AssetPage {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Aggregate counts for the dashboard.
    pub async fn stats(pool: &PgPool) -> Result<AssetStats, sqlx::Error> {
        let cutoff =
            chrono::Utc::now().date_naive() + chrono::Duration::days(REFRESH_WINDOW_DAYS);

        let (total, active, unassigned, due_for_refresh): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = $1), \
                    COUNT(*) FILTER (WHERE assigned_user_name IS NULL \
                        OR assigned_user_name = '' OR status = $2), \
                    COUNT(*) FILTER (WHERE refresh_due_date IS NOT NULL \
                        AND refresh_due_date <= $3 AND status = $1) \
             FROM assets",
        )
        .bind(AssetStatus::Active.as_str())
        .bind(AssetStatus::Unassigned.as_str())
        .bind(cutoff)
        .fetch_one(pool)
        .await?;

        let departments: Vec<(String, i64)> = sqlx::query_as(
            "SELECT department, COUNT(*) FROM assets \
             WHERE department IS NOT NULL AND department <> '' AND status = $1 \
             GROUP BY department \
             ORDER BY department",
        )
        .bind(AssetStatus::Active.as_str())
        .fetch_all(pool)
        .await?;

        Ok(AssetStats {
            total,
            active,
            unassigned,
            due_for_refresh,
            department_counts: departments
                .into_iter()
                .map(|(department, count)| DepartmentCount { department, count })
                .collect(),
        })
    }

    /// Insert a new asset from a transformed record, returning the row.
    ///
    /// The record must carry a non-blank tag; the table constraints reject
    /// anything else.
    pub async fn create_from_record(
        pool: &PgPool,
        record: &AssetRecord,
    ) -> Result<Asset, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let asset = Self::insert_from_record(&mut tx, record).await?;
        tx.commit().await?;
        Ok(asset)
    }

    /// Apply a partial edit, writing one `update`-kind history entry per
    /// changed monitored field. Returns `None` if no such asset exists.
    pub async fn update_with_history(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
        changed_by: &str,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 FOR UPDATE");
        let Some(old) = sqlx::query_as::<_, Asset>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let update = format!(
            "UPDATE assets SET \
                computer_name = COALESCE($2, computer_name), \
                serial_number = COALESCE($3, serial_number), \
                device_type = COALESCE($4, device_type), \
                make = COALESCE($5, make), \
                model = COALESCE($6, model), \
                operating_system = COALESCE($7, operating_system), \
                specs = COALESCE($8, specs), \
                purchase_date = COALESCE($9, purchase_date), \
                warranty_expiration = COALESCE($10, warranty_expiration), \
                refresh_due_date = COALESCE($11, refresh_due_date), \
                status = COALESCE($12, status), \
                assigned_user_name = COALESCE($13, assigned_user_name), \
                assigned_user_id = COALESCE($14, assigned_user_id), \
                department = COALESCE($15, department), \
                cost_center = COALESCE($16, cost_center), \
                location_building = COALESCE($17, location_building), \
                location_floor = COALESCE($18, location_floor), \
                location_room = COALESCE($19, location_room), \
                notes = COALESCE($20, notes), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Asset>(&update)
            .bind(id)
            .bind(input.computer_name.as_deref())
            .bind(input.serial_number.as_deref())
            .bind(input.device_type.as_deref())
            .bind(input.make.as_deref())
            .bind(input.model.as_deref())
            .bind(input.operating_system.as_deref())
            .bind(input.specs.as_deref())
            .bind(input.purchase_date)
            .bind(input.warranty_expiration)
            .bind(input.refresh_due_date)
            .bind(input.status.as_deref())
            .bind(input.assigned_user_name.as_deref())
            .bind(input.assigned_user_id.as_deref())
            .bind(input.department.as_deref())
            .bind(input.cost_center.as_deref())
            .bind(input.location_building.as_deref())
            .bind(input.location_floor.as_deref())
            .bind(input.location_room.as_deref())
            .bind(input.notes.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        for field in MONITORED_FIELDS {
            let Some(new_value) = monitored_update_value(input, field) else {
                continue;
            };
            let old_value = monitored_asset_value(&old, field);
            if old_value == Some(new_value) {
                continue;
            }
            AssetHistoryRepo::append(
                &mut tx,
                &NewHistoryEntry {
                    asset_id: id,
                    import_id: None,
                    change_type: ChangeKind::Update,
                    field_name: Some(field),
                    old_value,
                    new_value: Some(new_value),
                    changed_by,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Retire an asset (the catalog's notion of deletion), writing a
    /// `status_change` history entry. Returns `None` if no such asset.
    pub async fn retire(
        pool: &PgPool,
        id: DbId,
        changed_by: &str,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 FOR UPDATE");
        let Some(old) = sqlx::query_as::<_, Asset>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let update = format!(
            "UPDATE assets SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Asset>(&update)
            .bind(id)
            .bind(AssetStatus::Retired.as_str())
            .fetch_one(&mut *tx)
            .await?;

        if old.status != AssetStatus::Retired.as_str() {
            AssetHistoryRepo::append(
                &mut tx,
                &NewHistoryEntry {
                    asset_id: id,
                    import_id: None,
                    change_type: ChangeKind::StatusChange,
                    field_name: Some("status"),
                    old_value: Some(&old.status),
                    new_value: Some(AssetStatus::Retired.as_str()),
                    changed_by,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    // -----------------------------------------------------------------------
    // Transaction-scoped pieces used by the import committer
    // -----------------------------------------------------------------------

    /// Existence check by tag under a row lock, so concurrent commits
    /// touching the same tag serialize instead of losing updates.
    pub async fn find_id_by_tag_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tag: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM assets WHERE asset_tag = $1 FOR UPDATE")
                .bind(tag)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Insert a new asset from a transformed record inside a transaction.
    pub async fn insert_from_record(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        record: &AssetRecord,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (\
                asset_tag, computer_name, serial_number, operating_system, \
                status, assigned_user_name, assigned_user_id, department, notes\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(record.asset_tag.as_deref().unwrap_or_default())
            .bind(record.computer_name.as_deref())
            .bind(record.serial_number.as_deref())
            .bind(record.operating_system.as_deref())
            .bind(&record.status)
            .bind(record.assigned_user_name.as_deref())
            .bind(record.assigned_user_id.as_deref())
            .bind(record.department.as_deref())
            .bind(record.notes.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite every non-tag record field on an existing asset.
    ///
    /// The transformer emits all record fields (unmapped ones as NULL), and
    /// the import upsert writes exactly those values, NULLs included.
    pub async fn overwrite_from_record(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        record: &AssetRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE assets SET \
                computer_name = $2, serial_number = $3, operating_system = $4, \
                status = $5, assigned_user_name = $6, assigned_user_id = $7, \
                department = $8, notes = $9, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(record.computer_name.as_deref())
        .bind(record.serial_number.as_deref())
        .bind(record.operating_system.as_deref())
        .bind(&record.status)
        .bind(record.assigned_user_name.as_deref())
        .bind(record.assigned_user_id.as_deref())
        .bind(record.department.as_deref())
        .bind(record.notes.as_deref())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Delete an asset by ID inside a transaction (rollback engine only;
    /// history cascades with the row).
    pub async fn delete_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Current value of a monitored field on a catalog row.
fn monitored_asset_value<'a>(asset: &'a Asset, field: &str) -> Option<&'a str> {
    match field {
        "department" => asset.department.as_deref(),
        "assigned_user_name" => asset.assigned_user_name.as_deref(),
        "assigned_user_id" => asset.assigned_user_id.as_deref(),
        "status" => Some(asset.status.as_str()),
        "operating_system" => asset.operating_system.as_deref(),
        "notes" => asset.notes.as_deref(),
        "computer_name" => asset.computer_name.as_deref(),
        _ => None,
    }
}

/// Value a partial edit supplies for a monitored field, if any.
fn monitored_update_value<'a>(input: &'a UpdateAsset, field: &str) -> Option<&'a str> {
    match field {
        "department" => input.department.as_deref(),
        "assigned_user_name" => input.assigned_user_name.as_deref(),
        "assigned_user_id" => input.assigned_user_id.as_deref(),
        "status" => input.status.as_deref(),
        "operating_system" => input.operating_system.as_deref(),
        "notes" => input.notes.as_deref(),
        "computer_name" => input.computer_name.as_deref(),
        _ => None,
    }
}
