//! Verification campaign models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qm_core::types::{DbId, Timestamp};

/// A row from the `verification_campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationCampaign {
    pub id: DbId,
    pub name: String,
    /// `None` scopes the campaign to all departments.
    pub department: Option<String>,
    pub created_at: Timestamp,
    pub created_by: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub verified_count: i32,
    pub total_count: i32,
}

/// A row from the `verification_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationRecord {
    pub id: DbId,
    pub campaign_id: Option<DbId>,
    pub asset_id: DbId,
    pub verified_at: Timestamp,
    pub verified_by: String,
    pub verified_status: String,
    pub notes: Option<String>,
}

/// DTO for creating a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub department: Option<String>,
    pub created_by: String,
    pub due_date: Option<NaiveDate>,
}

/// DTO for verifying one asset within a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAsset {
    pub asset_id: DbId,
    pub verified_by: String,
    /// One of `verified`, `discrepancy`, `not_found`; defaults to `verified`.
    pub verified_status: Option<String>,
    pub notes: Option<String>,
}
