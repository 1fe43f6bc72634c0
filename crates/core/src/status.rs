//! Status and change-kind enums shared across the pipeline, the store
//! layer, and the HTTP surface.
//!
//! Every enum round-trips through the exact strings stored in the
//! database; `from_str` is strict and returns `None` for unknown values
//! (lenient synonym handling lives in [`crate::normalize`]).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Asset status
// ---------------------------------------------------------------------------

/// Lifecycle status of a catalog asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    Active,
    Retired,
    InRepair,
    Lost,
    Unassigned,
}

impl AssetStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Retired => "retired",
            Self::InRepair => "in-repair",
            Self::Lost => "lost",
            Self::Unassigned => "unassigned",
        }
    }

    /// Parse a canonical status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "retired" => Some(Self::Retired),
            "in-repair" => Some(Self::InRepair),
            "lost" => Some(Self::Lost),
            "unassigned" => Some(Self::Unassigned),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] =
        &["active", "retired", "in-repair", "lost", "unassigned"];
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Import status
// ---------------------------------------------------------------------------

/// Status of a spreadsheet import record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    Completed,
    Failed,
    RolledBack,
}

impl ImportStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "rolled_back" => Some(Self::RolledBack),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "completed", "failed", "rolled_back"];
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// History change kind
// ---------------------------------------------------------------------------

/// Classification of an asset history entry.
///
/// - `Update`       -- a direct field edit (old/new values recorded).
/// - `Import`       -- created or overwritten by a spreadsheet import
///   (marker only; the import path records no per-field diff).
/// - `StatusChange` -- a lifecycle transition such as retirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Update,
    Import,
    StatusChange,
}

impl ChangeKind {
    /// Return the change kind as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Import => "import",
            Self::StatusChange => "status_change",
        }
    }

    /// Parse a change-kind string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "update" => Some(Self::Update),
            "import" => Some(Self::Import),
            "status_change" => Some(Self::StatusChange),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Outcome recorded when an asset is physically verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Discrepancy,
    NotFound,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Discrepancy => "discrepancy",
            Self::NotFound => "not_found",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verified" => Some(Self::Verified),
            "discrepancy" => Some(Self::Discrepancy),
            "not_found" => Some(Self::NotFound),
            _ => None,
        }
    }
}

/// Lifecycle status of a verification campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Completed,
    Expired,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_status_round_trips_all_values() {
        for name in AssetStatus::ALL {
            let parsed = AssetStatus::from_str(name).expect("every listed value parses");
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn asset_status_rejects_unknown() {
        assert_eq!(AssetStatus::from_str("repair"), None);
        assert_eq!(AssetStatus::from_str("ACTIVE"), None);
        assert_eq!(AssetStatus::from_str(""), None);
    }

    #[test]
    fn asset_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&AssetStatus::InRepair).unwrap();
        assert_eq!(json, "\"in-repair\"");
        let parsed: AssetStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AssetStatus::InRepair);
    }

    #[test]
    fn import_status_round_trips_all_values() {
        for name in ImportStatus::ALL {
            let parsed = ImportStatus::from_str(name).expect("every listed value parses");
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn change_kind_round_trips() {
        for kind in [
            ChangeKind::Update,
            ChangeKind::Import,
            ChangeKind::StatusChange,
        ] {
            assert_eq!(ChangeKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", AssetStatus::InRepair), "in-repair");
        assert_eq!(format!("{}", ImportStatus::RolledBack), "rolled_back");
        assert_eq!(format!("{}", ChangeKind::StatusChange), "status_change");
    }
}
