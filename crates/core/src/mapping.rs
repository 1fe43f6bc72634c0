//! Column auto-mapping: propose which spreadsheet column feeds each
//! canonical asset field.
//!
//! Matching is ordered, case-insensitive substring search. For each field
//! the first pattern that matches any header wins, and among headers
//! matching that pattern the first in source order wins. The mapping is
//! deliberately non-injective: two fields may claim the same header (e.g.
//! `asset_tag` and `computer_name` both matching "Computer Name" when no
//! more specific header exists). Such collisions are reported as ambiguity
//! warnings for the caller to surface, never resolved silently.

use serde::{Deserialize, Serialize};

/// Canonical asset fields a spreadsheet column can map to, in the order
/// they are matched and displayed.
pub const CANONICAL_FIELDS: &[&str] = &[
    "asset_tag",
    "computer_name",
    "department",
    "assigned_user_name",
    "assigned_user_id",
    "operating_system",
    "serial_number",
    "status",
    "notes",
];

/// Ordered substring patterns per canonical field. Order is load-bearing:
/// more specific patterns come first so that, e.g., "Asset Tag" is claimed
/// by `asset_tag` before the generic "tag" pattern even looks.
const FIELD_PATTERNS: &[(&str, &[&str])] = &[
    (
        "asset_tag",
        &[
            "asset tag",
            "asset_tag",
            "asset",
            "computer name",
            "computer_name",
            "tag",
            "id",
        ],
    ),
    (
        "computer_name",
        &["computer name", "computer_name", "name", "hostname"],
    ),
    ("department", &["department", "dept", "division", "group"]),
    (
        "assigned_user_name",
        &[
            "user",
            "username",
            "assigned to",
            "assigned_to",
            "user name",
            "user_name",
            "employee",
            "owner",
        ],
    ),
    (
        "assigned_user_id",
        &["user id", "user_id", "employee id", "employee_id", "userid"],
    ),
    (
        "operating_system",
        &["os", "operating system", "operating_system", "platform"],
    ),
    (
        "serial_number",
        &["serial", "serial number", "serial_number", "sn"],
    ),
    ("status", &["status", "state"]),
    (
        "notes",
        &["notes", "note", "comments", "comment", "description"],
    ),
];

/// Accepted mapping from canonical fields to source column headers.
///
/// `None` means "no match" / unmapped; the transformer treats the field as
/// absent for every row. Deserializes leniently so callers may submit only
/// the fields they mapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub asset_tag: Option<String>,
    pub computer_name: Option<String>,
    pub department: Option<String>,
    pub assigned_user_name: Option<String>,
    pub assigned_user_id: Option<String>,
    pub operating_system: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl ColumnMapping {
    /// All (field, mapped header) pairs in canonical order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("asset_tag", self.asset_tag.as_deref()),
            ("computer_name", self.computer_name.as_deref()),
            ("department", self.department.as_deref()),
            ("assigned_user_name", self.assigned_user_name.as_deref()),
            ("assigned_user_id", self.assigned_user_id.as_deref()),
            ("operating_system", self.operating_system.as_deref()),
            ("serial_number", self.serial_number.as_deref()),
            ("status", self.status.as_deref()),
            ("notes", self.notes.as_deref()),
        ]
    }

    /// Number of fields with a mapped source header.
    pub fn mapped_count(&self) -> usize {
        self.entries().iter().filter(|(_, h)| h.is_some()).count()
    }

    fn set(&mut self, field: &str, header: Option<String>) {
        match field {
            "asset_tag" => self.asset_tag = header,
            "computer_name" => self.computer_name = header,
            "department" => self.department = header,
            "assigned_user_name" => self.assigned_user_name = header,
            "assigned_user_id" => self.assigned_user_id = header,
            "operating_system" => self.operating_system = header,
            "serial_number" => self.serial_number = header,
            "status" => self.status = header,
            "notes" => self.notes = header,
            _ => {}
        }
    }
}

/// A source header claimed by more than one canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousHeader {
    /// The header as it appears in the sheet.
    pub header: String,
    /// Fields that mapped to it, in canonical order.
    pub fields: Vec<String>,
}

/// A proposed mapping plus the collisions a reviewer should look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSuggestion {
    pub mapping: ColumnMapping,
    pub ambiguous_headers: Vec<AmbiguousHeader>,
}

/// Propose a mapping for the given source headers (as they literally appear,
/// case preserved). Never fails; unmatched fields stay unmapped.
pub fn suggest_mapping(headers: &[String]) -> MappingSuggestion {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let mut mapping = ColumnMapping::default();
    for (field, patterns) in FIELD_PATTERNS {
        mapping.set(field, match_header(patterns, headers, &lowered));
    }

    let mut ambiguous_headers = Vec::new();
    for header in headers {
        let fields: Vec<String> = mapping
            .entries()
            .iter()
            .filter(|(_, mapped)| *mapped == Some(header.as_str()))
            .map(|(field, _)| field.to_string())
            .collect();
        if fields.len() > 1 {
            ambiguous_headers.push(AmbiguousHeader {
                header: header.clone(),
                fields,
            });
        }
    }

    MappingSuggestion {
        mapping,
        ambiguous_headers,
    }
}

/// First header (in source order) matched by the first pattern that matches
/// anything.
fn match_header(patterns: &[&str], headers: &[String], lowered: &[String]) -> Option<String> {
    for pattern in patterns {
        for (i, candidate) in lowered.iter().enumerate() {
            if candidate.contains(pattern) {
                return Some(headers[i].clone());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_exact_headers() {
        let suggestion = suggest_mapping(&headers(&[
            "Asset Tag",
            "Serial Number",
            "Department",
            "Status",
        ]));
        let m = &suggestion.mapping;
        assert_eq!(m.asset_tag.as_deref(), Some("Asset Tag"));
        assert_eq!(m.serial_number.as_deref(), Some("Serial Number"));
        assert_eq!(m.department.as_deref(), Some("Department"));
        assert_eq!(m.status.as_deref(), Some("Status"));
        assert_eq!(m.computer_name, None);
    }

    #[test]
    fn computer_name_pattern_beats_generic_name_for_asset_tag() {
        // The documented determinism case: "computer name" is an asset_tag
        // pattern and matches before the mapper would ever consider "tag".
        let suggestion = suggest_mapping(&headers(&["Computer Name", "Dept", "Notes"]));
        let m = &suggestion.mapping;
        assert_eq!(m.asset_tag.as_deref(), Some("Computer Name"));
        assert_eq!(m.department.as_deref(), Some("Dept"));
        assert_eq!(m.notes.as_deref(), Some("Notes"));
    }

    #[test]
    fn same_header_may_serve_two_fields_and_is_reported() {
        let suggestion = suggest_mapping(&headers(&["Computer Name", "Dept"]));
        let m = &suggestion.mapping;
        assert_eq!(m.asset_tag.as_deref(), Some("Computer Name"));
        assert_eq!(m.computer_name.as_deref(), Some("Computer Name"));

        assert_eq!(suggestion.ambiguous_headers.len(), 1);
        let ambiguous = &suggestion.ambiguous_headers[0];
        assert_eq!(ambiguous.header, "Computer Name");
        assert_eq!(ambiguous.fields, vec!["asset_tag", "computer_name"]);
    }

    #[test]
    fn first_matching_header_in_source_order_wins() {
        let suggestion = suggest_mapping(&headers(&["Primary User", "Secondary User"]));
        assert_eq!(
            suggestion.mapping.assigned_user_name.as_deref(),
            Some("Primary User")
        );
    }

    #[test]
    fn pattern_order_within_a_field_is_respected() {
        // "user id" must win over the bare "user_id" fallback spellings, and
        // assigned_user_name's "user" pattern grabs the same header first in
        // its own list without stealing from assigned_user_id.
        let suggestion = suggest_mapping(&headers(&["Employee ID", "User ID"]));
        assert_eq!(
            suggestion.mapping.assigned_user_id.as_deref(),
            Some("User ID")
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let suggestion = suggest_mapping(&headers(&["ASSET TAG", "operating SYSTEM"]));
        assert_eq!(suggestion.mapping.asset_tag.as_deref(), Some("ASSET TAG"));
        assert_eq!(
            suggestion.mapping.operating_system.as_deref(),
            Some("operating SYSTEM")
        );
    }

    #[test]
    fn no_headers_means_no_matches_and_no_errors() {
        let suggestion = suggest_mapping(&[]);
        assert_eq!(suggestion.mapping, ColumnMapping::default());
        assert!(suggestion.ambiguous_headers.is_empty());
        assert_eq!(suggestion.mapping.mapped_count(), 0);
    }

    #[test]
    fn partial_mapping_deserializes_with_missing_fields_unmapped() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"asset_tag": "Tag", "department": "Dept"}"#).unwrap();
        assert_eq!(mapping.asset_tag.as_deref(), Some("Tag"));
        assert_eq!(mapping.department.as_deref(), Some("Dept"));
        assert_eq!(mapping.notes, None);
        assert_eq!(mapping.mapped_count(), 2);
    }

    #[test]
    fn canonical_fields_and_patterns_stay_in_sync() {
        let pattern_fields: Vec<&str> = FIELD_PATTERNS.iter().map(|(f, _)| *f).collect();
        assert_eq!(pattern_fields, CANONICAL_FIELDS);
    }
}
