//! Delta detection: classify each transformed row as new, modified, or
//! unchanged relative to a snapshot of the existing catalog.
//!
//! Advisory only. The committer never consults this report; it re-derives
//! existence itself under a row lock, so a preview can go stale if the
//! catalog changes between preview and commit. Callers wanting an accurate
//! preview re-run detection against a fresh snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::AssetRecord;

/// Fields compared when deciding whether an existing asset is modified.
/// Deliberately narrow: administrative and location fields are not diffed.
pub const MONITORED_FIELDS: &[&str] = &[
    "department",
    "assigned_user_name",
    "assigned_user_id",
    "status",
    "operating_system",
    "notes",
    "computer_name",
];

/// One differing field on a modified row. Blank values are reported as
/// absent, matching how they were compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// A row with no existing asset for its tag (or no tag at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRow {
    pub row_index: usize,
    pub record: AssetRecord,
}

/// A row whose tag matched an existing asset with at least one monitored
/// field differing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedRow {
    pub row_index: usize,
    pub asset_tag: String,
    pub changes: Vec<FieldChange>,
    pub record: AssetRecord,
}

/// A row whose tag matched an existing asset with no monitored differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnchangedRow {
    pub row_index: usize,
    pub asset_tag: String,
}

/// Three-way partition of a batch. Every input row lands in exactly one
/// bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub new: Vec<NewRow>,
    pub modified: Vec<ModifiedRow>,
    pub unchanged: Vec<UnchangedRow>,
}

impl DeltaReport {
    pub fn new_count(&self) -> usize {
        self.new.len()
    }

    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    pub fn unchanged_count(&self) -> usize {
        self.unchanged.len()
    }
}

/// Compare a transformed batch against existing assets keyed by tag.
///
/// `existing` values are the catalog rows projected onto [`AssetRecord`];
/// comparison collapses blank and missing to one absent sentinel, so `""`
/// in the catalog equals an unmapped cell in the sheet.
pub fn detect_deltas(
    batch: &[AssetRecord],
    existing: &HashMap<String, AssetRecord>,
) -> DeltaReport {
    let mut report = DeltaReport::default();

    for (row_index, record) in batch.iter().enumerate() {
        let tag = match record.field("asset_tag") {
            Some(tag) => tag.to_string(),
            None => {
                report.new.push(NewRow {
                    row_index,
                    record: record.clone(),
                });
                continue;
            }
        };

        let Some(current) = existing.get(&tag) else {
            report.new.push(NewRow {
                row_index,
                record: record.clone(),
            });
            continue;
        };

        let changes = compare_records(current, record);
        if changes.is_empty() {
            report.unchanged.push(UnchangedRow {
                row_index,
                asset_tag: tag,
            });
        } else {
            report.modified.push(ModifiedRow {
                row_index,
                asset_tag: tag,
                changes,
                record: record.clone(),
            });
        }
    }

    report
}

/// Field-level diff over [`MONITORED_FIELDS`].
fn compare_records(current: &AssetRecord, incoming: &AssetRecord) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for field in MONITORED_FIELDS {
        let old = current.field(field);
        let new = incoming.field(field);
        if old != new {
            changes.push(FieldChange {
                field: (*field).to_string(),
                old: old.map(String::from),
                new: new.map(String::from),
            });
        }
    }
    changes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: Option<&str>) -> AssetRecord {
        AssetRecord {
            asset_tag: tag.map(String::from),
            computer_name: tag.map(String::from),
            serial_number: None,
            department: None,
            assigned_user_name: None,
            assigned_user_id: None,
            operating_system: None,
            notes: None,
            status: "active".to_string(),
        }
    }

    fn catalog(records: &[AssetRecord]) -> HashMap<String, AssetRecord> {
        records
            .iter()
            .map(|r| (r.asset_tag.clone().unwrap(), r.clone()))
            .collect()
    }

    #[test]
    fn untagged_and_unknown_tags_are_new() {
        let existing = catalog(&[record(Some("A-1"))]);
        let batch = vec![record(None), record(Some("B-2"))];

        let report = detect_deltas(&batch, &existing);
        assert_eq!(report.new_count(), 2);
        assert_eq!(report.new[0].row_index, 0);
        assert_eq!(report.new[1].row_index, 1);
        assert_eq!(report.modified_count() + report.unchanged_count(), 0);
    }

    #[test]
    fn identical_record_is_unchanged() {
        let existing = catalog(&[record(Some("A-1"))]);
        let report = detect_deltas(&[record(Some("A-1"))], &existing);

        assert_eq!(report.unchanged_count(), 1);
        assert_eq!(report.unchanged[0].asset_tag, "A-1");
    }

    #[test]
    fn changed_monitored_field_is_modified_with_diff() {
        let mut current = record(Some("A-1"));
        current.department = Some("NEWS".to_string());
        let existing = catalog(&[current]);

        let mut incoming = record(Some("A-1"));
        incoming.department = Some("ENG".to_string());

        let report = detect_deltas(&[incoming], &existing);
        assert_eq!(report.modified_count(), 1);
        let changes = &report.modified[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "department");
        assert_eq!(changes[0].old.as_deref(), Some("NEWS"));
        assert_eq!(changes[0].new.as_deref(), Some("ENG"));
    }

    #[test]
    fn blank_and_missing_compare_equal() {
        let mut current = record(Some("A-1"));
        current.notes = Some("".to_string());
        current.operating_system = Some("   ".to_string());
        let existing = catalog(&[current]);

        let incoming = record(Some("A-1"));
        let report = detect_deltas(&[incoming], &existing);
        assert_eq!(report.unchanged_count(), 1);
    }

    #[test]
    fn unmonitored_fields_do_not_trigger_modified() {
        let mut current = record(Some("A-1"));
        current.serial_number = Some("SN-OLD".to_string());
        let existing = catalog(&[current]);

        let mut incoming = record(Some("A-1"));
        incoming.serial_number = Some("SN-NEW".to_string());

        let report = detect_deltas(&[incoming], &existing);
        assert_eq!(report.unchanged_count(), 1);
        assert_eq!(report.modified_count(), 0);
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let mut changed = record(Some("A-1"));
        changed.status = "lost".to_string();
        let existing = catalog(&[record(Some("A-1")), record(Some("B-2"))]);
        let batch = vec![
            changed,             // modified
            record(Some("B-2")), // unchanged
            record(Some("C-3")), // new
            record(None),        // new (no tag)
        ];

        let report = detect_deltas(&batch, &existing);
        let mut seen: Vec<usize> = report
            .new
            .iter()
            .map(|r| r.row_index)
            .chain(report.modified.iter().map(|r| r.row_index))
            .chain(report.unchanged.iter().map(|r| r.row_index))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn multiple_fields_diff_together() {
        let mut current = record(Some("A-1"));
        current.assigned_user_name = Some("Jane".to_string());
        let existing = catalog(&[current]);

        let mut incoming = record(Some("A-1"));
        incoming.assigned_user_name = Some("Bob".to_string());
        incoming.status = "in-repair".to_string();
        incoming.notes = Some("swapped disk".to_string());

        let report = detect_deltas(&[incoming], &existing);
        let fields: Vec<&str> = report.modified[0]
            .changes
            .iter()
            .map(|c| c.field.as_str())
            .collect();
        assert_eq!(fields, vec!["assigned_user_name", "status", "notes"]);
    }
}
