//! Batch validation of transformed records against the existing catalog.
//!
//! Validation never fails: every finding comes back as data. Catalog
//! duplicates are findings too, even though the committer treats them as
//! update targets rather than rejects -- the report tells the caller what
//! the commit will collide with, and the caller decides.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::AssetRecord;
use crate::status::AssetStatus;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 1-based row number, matching what a person sees in the sheet.
    pub row: usize,
    /// Canonical field the finding is about.
    pub field: String,
    pub message: String,
}

/// Outcome of validating a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    /// 0-based indices of rows with no findings, in batch order.
    pub valid_rows: Vec<usize>,
    pub total_rows: usize,
}

impl ValidationReport {
    pub fn valid_count(&self) -> usize {
        self.valid_rows.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a transformed batch against the set of tags already in the
/// catalog. Rules, per row:
///
/// - "missing identifier" when both `asset_tag` and `computer_name` are
///   absent;
/// - "duplicate tag" when the tag exists in the catalog, or an earlier row
///   in this batch already used it;
/// - "invalid status" when a status value is present but not canonical
///   (unreachable for transformer output; kept as a safety net for records
///   built elsewhere).
pub fn validate_batch(batch: &[AssetRecord], existing_tags: &HashSet<String>) -> ValidationReport {
    let mut report = ValidationReport {
        total_rows: batch.len(),
        ..ValidationReport::default()
    };
    let mut seen_tags: HashSet<&str> = HashSet::new();

    for (index, record) in batch.iter().enumerate() {
        let row = index + 1;
        let before = report.errors.len();

        let tag = record.field("asset_tag");
        if tag.is_none() && record.field("computer_name").is_none() {
            report.errors.push(ValidationError {
                row,
                field: "asset_tag".to_string(),
                message: "missing identifier: row has neither an asset tag nor a computer name"
                    .to_string(),
            });
        }

        if let Some(tag) = tag {
            if existing_tags.contains(tag) {
                report.errors.push(ValidationError {
                    row,
                    field: "asset_tag".to_string(),
                    message: format!("asset tag '{tag}' already exists in the catalog"),
                });
            } else if seen_tags.contains(tag) {
                report.errors.push(ValidationError {
                    row,
                    field: "asset_tag".to_string(),
                    message: format!("asset tag '{tag}' appears more than once in this import"),
                });
            }
            seen_tags.insert(tag);
        }

        if let Some(status) = record.field("status") {
            if AssetStatus::from_str(status).is_none() {
                report.errors.push(ValidationError {
                    row,
                    field: "status".to_string(),
                    message: format!("status '{status}' is not a recognized value"),
                });
            }
        }

        if report.errors.len() == before {
            report.valid_rows.push(index);
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: Option<&str>, computer_name: Option<&str>) -> AssetRecord {
        AssetRecord {
            asset_tag: tag.map(String::from),
            computer_name: computer_name.map(String::from),
            serial_number: None,
            department: None,
            assigned_user_name: None,
            assigned_user_id: None,
            operating_system: None,
            notes: None,
            status: "active".to_string(),
        }
    }

    fn tags(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_identifier_is_flagged_and_row_excluded() {
        let batch = vec![record(None, None), record(Some("A-1"), None)];
        let report = validate_batch(&batch, &HashSet::new());

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].row, 1);
        assert_eq!(report.errors[0].field, "asset_tag");
        assert!(report.errors[0].message.contains("missing identifier"));
        assert_eq!(report.valid_rows, vec![1]);
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn computer_name_alone_satisfies_the_identifier_rule() {
        let batch = vec![record(None, Some("LAB-PC"))];
        let report = validate_batch(&batch, &HashSet::new());
        assert!(report.is_clean());
        assert_eq!(report.valid_rows, vec![0]);
    }

    #[test]
    fn catalog_duplicate_is_flagged() {
        let batch = vec![record(Some("A-1"), None)];
        let report = validate_batch(&batch, &tags(&["A-1"]));

        assert_eq!(report.error_count(), 1);
        assert!(report.errors[0].message.contains("already exists"));
        assert!(report.valid_rows.is_empty());
    }

    #[test]
    fn intra_batch_duplicate_is_flagged_on_the_later_row() {
        let batch = vec![record(Some("A-1"), None), record(Some("A-1"), None)];
        let report = validate_batch(&batch, &HashSet::new());

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].row, 2);
        assert!(report.errors[0].message.contains("more than once"));
        assert_eq!(report.valid_rows, vec![0]);
    }

    #[test]
    fn invalid_status_is_flagged() {
        let mut bad = record(Some("A-1"), None);
        bad.status = "scrapped".to_string();
        let report = validate_batch(&[bad], &HashSet::new());

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].field, "status");
        assert!(report.valid_rows.is_empty());
    }

    #[test]
    fn one_row_can_collect_multiple_findings() {
        let mut bad = record(None, None);
        bad.status = "scrapped".to_string();
        let report = validate_batch(&[bad], &HashSet::new());

        assert_eq!(report.error_count(), 2);
        assert!(report.valid_rows.is_empty());
        assert_eq!(report.total_rows, 1);
    }

    #[test]
    fn findings_never_escalate_to_errors() {
        // A fully hostile batch still comes back as a report.
        let batch = vec![record(None, None); 100];
        let report = validate_batch(&batch, &tags(&["A-1"]));
        assert_eq!(report.error_count(), 100);
        assert_eq!(report.total_rows, 100);
    }

    #[test]
    fn empty_batch_is_clean() {
        let report = validate_batch(&[], &tags(&["A-1"]));
        assert!(report.is_clean());
        assert_eq!(report.total_rows, 0);
        assert!(report.valid_rows.is_empty());
    }
}
