//! Repository for verification campaigns and per-asset verification records.

use sqlx::PgPool;

use qm_core::status::{AssetStatus, CampaignStatus, VerificationStatus};
use qm_core::types::DbId;

use crate::models::verification::{
    CreateCampaign, VerificationCampaign, VerificationRecord, VerifyAsset,
};

const CAMPAIGN_COLUMNS: &str = "\
    id, name, department, created_at, created_by, due_date, status, \
    verified_count, total_count";

const RECORD_COLUMNS: &str = "\
    id, campaign_id, asset_id, verified_at, verified_by, verified_status, notes";

/// Provides campaign lifecycle and per-asset verification.
pub struct VerificationRepo;

impl VerificationRepo {
    /// Open a campaign, snapshotting how many active assets are in scope.
    pub async fn create_campaign(
        pool: &PgPool,
        input: &CreateCampaign,
    ) -> Result<VerificationCampaign, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let total: (i64,) = match input.department.as_deref() {
            Some(department) => {
                sqlx::query_as("SELECT COUNT(*) FROM assets WHERE status = $1 AND department = $2")
                    .bind(AssetStatus::Active.as_str())
                    .bind(department)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM assets WHERE status = $1")
                    .bind(AssetStatus::Active.as_str())
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let query = format!(
            "INSERT INTO verification_campaigns \
                (name, department, created_by, due_date, status, total_count) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, VerificationCampaign>(&query)
            .bind(&input.name)
            .bind(input.department.as_deref())
            .bind(&input.created_by)
            .bind(input.due_date)
            .bind(CampaignStatus::Active.as_str())
            .bind(total.0 as i32)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(campaign)
    }

    pub async fn find_campaign(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VerificationCampaign>, sqlx::Error> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM verification_campaigns WHERE id = $1");
        sqlx::query_as::<_, VerificationCampaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All campaigns, newest first.
    pub async fn list_campaigns(pool: &PgPool) -> Result<Vec<VerificationCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM verification_campaigns \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, VerificationCampaign>(&query)
            .fetch_all(pool)
            .await
    }

    /// Verification records for one campaign, newest first.
    pub async fn list_records(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<VerificationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM verification_records \
             WHERE campaign_id = $1 \
             ORDER BY verified_at DESC, id DESC"
        );
        sqlx::query_as::<_, VerificationRecord>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Record a sighting of one asset within a campaign.
    ///
    /// Re-verifying the same asset replaces the previous record instead of
    /// stacking duplicates. The asset's own `last_verified_at/by` are
    /// stamped, and the campaign's `verified_count` is refreshed from the
    /// distinct records. Returns `None` when the campaign or asset does not
    /// exist.
    pub async fn verify_asset(
        pool: &PgPool,
        campaign_id: DbId,
        input: &VerifyAsset,
    ) -> Result<Option<VerificationRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let campaign: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM verification_campaigns WHERE id = $1 FOR UPDATE")
                .bind(campaign_id)
                .fetch_optional(&mut *tx)
                .await?;
        if campaign.is_none() {
            return Ok(None);
        }

        let stamped = sqlx::query(
            "UPDATE assets SET last_verified_at = now(), last_verified_by = $2 WHERE id = $1",
        )
        .bind(input.asset_id)
        .bind(&input.verified_by)
        .execute(&mut *tx)
        .await?;
        if stamped.rows_affected() == 0 {
            return Ok(None);
        }

        let verified_status = input
            .verified_status
            .as_deref()
            .unwrap_or(VerificationStatus::Verified.as_str());
        let query = format!(
            "INSERT INTO verification_records \
                (campaign_id, asset_id, verified_by, verified_status, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (campaign_id, asset_id) DO UPDATE SET \
                verified_at = now(), verified_by = EXCLUDED.verified_by, \
                verified_status = EXCLUDED.verified_status, notes = EXCLUDED.notes \
             RETURNING {RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, VerificationRecord>(&query)
            .bind(campaign_id)
            .bind(input.asset_id)
            .bind(&input.verified_by)
            .bind(verified_status)
            .bind(input.notes.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE verification_campaigns SET verified_count = \
                (SELECT COUNT(*) FROM verification_records WHERE campaign_id = $1) \
             WHERE id = $1",
        )
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }
}
