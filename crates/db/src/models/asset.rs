//! Asset catalog models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use qm_core::record::AssetRecord;
use qm_core::types::{DbId, Timestamp};

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub asset_tag: String,
    pub computer_name: Option<String>,
    pub serial_number: Option<String>,
    pub device_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub operating_system: Option<String>,
    pub specs: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub refresh_due_date: Option<NaiveDate>,
    pub status: String,
    pub assigned_user_name: Option<String>,
    pub assigned_user_id: Option<String>,
    pub department: Option<String>,
    pub cost_center: Option<String>,
    pub location_building: Option<String>,
    pub location_floor: Option<String>,
    pub location_room: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_verified_at: Option<Timestamp>,
    pub last_verified_by: Option<String>,
}

impl Asset {
    /// Project the catalog row onto the canonical record shape the delta
    /// detector compares against.
    pub fn to_record(&self) -> AssetRecord {
        AssetRecord {
            asset_tag: Some(self.asset_tag.clone()),
            computer_name: self.computer_name.clone(),
            serial_number: self.serial_number.clone(),
            department: self.department.clone(),
            assigned_user_name: self.assigned_user_name.clone(),
            assigned_user_id: self.assigned_user_id.clone(),
            operating_system: self.operating_system.clone(),
            notes: self.notes.clone(),
            status: self.status.clone(),
        }
    }
}

/// DTO for a partial asset edit. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAsset {
    pub computer_name: Option<String>,
    pub serial_number: Option<String>,
    pub device_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub operating_system: Option<String>,
    pub specs: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub refresh_due_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub assigned_user_name: Option<String>,
    pub assigned_user_id: Option<String>,
    pub department: Option<String>,
    pub cost_center: Option<String>,
    pub location_building: Option<String>,
    pub location_floor: Option<String>,
    pub location_room: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for listing/searching assets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetSearchParams {
    /// Substring match (ILIKE) across tag, computer name, user name,
    /// serial number, and department.
    pub search: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    /// Whitelisted column name; unknown values fall back to `asset_tag`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub sort_dir: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size (default 50, max 100).
    pub per_page: Option<i64>,
}

/// Paginated asset listing.
#[derive(Debug, Clone, Serialize)]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Aggregate catalog counts for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AssetStats {
    pub total: i64,
    pub active: i64,
    /// Assets with no assigned user, plus anything explicitly `unassigned`.
    pub unassigned: i64,
    /// Active assets whose refresh date falls within the lookahead window.
    pub due_for_refresh: i64,
    /// Active-asset counts per department, alphabetical.
    pub department_counts: Vec<DepartmentCount>,
}

/// One department's share of the active catalog.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}
