//! Field normalizers: pure, total functions that canonicalize individual
//! spreadsheet values before they reach validation or the store.

use crate::status::AssetStatus;

/// Known department spellings and the canonical name each maps to.
/// Unknown departments pass through uppercased rather than being rejected.
const DEPARTMENT_ALIASES: &[(&str, &str)] = &[
    ("IT", "IT"),
    ("NEWS", "NEWS"),
    ("SALES", "SALES"),
    ("ENG", "ENG"),
    ("ENGINEERING", "ENG"),
    ("WEATHER", "WEATHER"),
    ("SPORTS", "SPORTS"),
    ("CREATIVE SERVICES", "CREATIVE SERVICES"),
    ("CREATIVE", "CREATIVE SERVICES"),
    ("ACCOUNTING", "ACCOUNTING"),
    ("FINANCE", "FINANCE"),
];

/// Status synonyms accepted on input, mapped to canonical statuses.
const STATUS_SYNONYMS: &[(&str, AssetStatus)] = &[
    ("active", AssetStatus::Active),
    ("inactive", AssetStatus::Retired),
    ("retired", AssetStatus::Retired),
    ("in-repair", AssetStatus::InRepair),
    ("repair", AssetStatus::InRepair),
    ("lost", AssetStatus::Lost),
    ("unassigned", AssetStatus::Unassigned),
];

/// Canonicalize a department value: trim, uppercase, resolve known aliases.
/// Unknown values pass through uppercased; blank or missing input is absent.
pub fn normalize_department(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_uppercase();
    for (alias, canonical) in DEPARTMENT_ALIASES {
        if upper == *alias {
            return Some((*canonical).to_string());
        }
    }
    Some(upper)
}

/// Resolve a status value to one of the five canonical statuses.
///
/// Trims and lowercases, accepts the synonyms in [`STATUS_SYNONYMS`], and
/// defaults to [`AssetStatus::Active`] for anything unrecognized or missing.
/// Total and idempotent: canonical statuses map to themselves.
pub fn normalize_status(value: Option<&str>) -> AssetStatus {
    let lowered = match value {
        Some(v) => v.trim().to_lowercase(),
        None => return AssetStatus::Active,
    };
    for (synonym, status) in STATUS_SYNONYMS {
        if lowered == *synonym {
            return *status;
        }
    }
    AssetStatus::Active
}

/// Canonicalize an asset tag: trim and uppercase. Blank or missing input is
/// absent (the committer treats such rows as failed).
pub fn clean_asset_tag(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_uppercase())
}

/// Pieces extracted from a free-text notes cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNotes {
    /// Text before the first `" - "` separator (or the whole value).
    pub user_name: Option<String>,
    /// Text after the first separator, typically a secondary asset tag.
    /// Informational only; it never overrides an explicitly mapped tag.
    pub secondary_tag: Option<String>,
}

/// Split a notes value on the first `" - "` separator into a user name and
/// a secondary tag. Without a separator the whole trimmed value is the user
/// name; blank or missing input yields both absent.
pub fn parse_notes(value: Option<&str>) -> ParsedNotes {
    let raw = match value {
        Some(v) => v.trim(),
        None => return ParsedNotes::default(),
    };
    if raw.is_empty() {
        return ParsedNotes::default();
    }
    match raw.split_once(" - ") {
        Some((user, tag)) => ParsedNotes {
            user_name: non_blank(user),
            secondary_tag: non_blank(tag),
        },
        None => ParsedNotes {
            user_name: Some(raw.to_string()),
            secondary_tag: None,
        },
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalize_department --

    #[test]
    fn department_aliases_resolve() {
        assert_eq!(
            normalize_department(Some("Engineering")),
            Some("ENG".to_string())
        );
        assert_eq!(
            normalize_department(Some("creative")),
            Some("CREATIVE SERVICES".to_string())
        );
        assert_eq!(normalize_department(Some("it")), Some("IT".to_string()));
    }

    #[test]
    fn department_unknown_passes_through_uppercased() {
        assert_eq!(
            normalize_department(Some("  research & dev ")),
            Some("RESEARCH & DEV".to_string())
        );
    }

    #[test]
    fn department_blank_is_absent() {
        assert_eq!(normalize_department(None), None);
        assert_eq!(normalize_department(Some("")), None);
        assert_eq!(normalize_department(Some("   ")), None);
    }

    // -- normalize_status --

    #[test]
    fn status_synonyms_resolve() {
        assert_eq!(normalize_status(Some("inactive")), AssetStatus::Retired);
        assert_eq!(normalize_status(Some("Repair")), AssetStatus::InRepair);
        assert_eq!(normalize_status(Some(" LOST ")), AssetStatus::Lost);
    }

    #[test]
    fn status_unknown_or_missing_defaults_to_active() {
        assert_eq!(normalize_status(None), AssetStatus::Active);
        assert_eq!(normalize_status(Some("")), AssetStatus::Active);
        assert_eq!(normalize_status(Some("scrapped")), AssetStatus::Active);
    }

    #[test]
    fn status_is_total_and_idempotent() {
        let inputs = [
            None,
            Some(""),
            Some("active"),
            Some("Inactive"),
            Some("REPAIR"),
            Some("in-repair"),
            Some("lost"),
            Some("unassigned"),
            Some("garbage value"),
        ];
        for input in inputs {
            let once = normalize_status(input);
            assert!(AssetStatus::from_str(once.as_str()).is_some());
            let twice = normalize_status(Some(once.as_str()));
            assert_eq!(twice, once, "input: {input:?}");
        }
    }

    // -- clean_asset_tag --

    #[test]
    fn tag_trims_and_uppercases() {
        assert_eq!(clean_asset_tag(Some("abc-1 ")), Some("ABC-1".to_string()));
    }

    #[test]
    fn tag_is_idempotent() {
        let once = clean_asset_tag(Some(" fx-0042 ")).unwrap();
        assert_eq!(clean_asset_tag(Some(&once)), Some(once.clone()));
    }

    #[test]
    fn tag_blank_is_absent() {
        assert_eq!(clean_asset_tag(None), None);
        assert_eq!(clean_asset_tag(Some("  ")), None);
    }

    // -- parse_notes --

    #[test]
    fn notes_split_on_first_separator() {
        let parsed = parse_notes(Some("Jane Doe - PC-02"));
        assert_eq!(parsed.user_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.secondary_tag.as_deref(), Some("PC-02"));
    }

    #[test]
    fn notes_later_separators_stay_in_secondary_tag() {
        let parsed = parse_notes(Some("Jane Doe - PC-02 - spare"));
        assert_eq!(parsed.user_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.secondary_tag.as_deref(), Some("PC-02 - spare"));
    }

    #[test]
    fn notes_without_separator_all_user_name() {
        let parsed = parse_notes(Some("  shared lab machine "));
        assert_eq!(parsed.user_name.as_deref(), Some("shared lab machine"));
        assert_eq!(parsed.secondary_tag, None);
    }

    #[test]
    fn notes_hyphen_without_spaces_is_not_a_separator() {
        let parsed = parse_notes(Some("PC-02"));
        assert_eq!(parsed.user_name.as_deref(), Some("PC-02"));
        assert_eq!(parsed.secondary_tag, None);
    }

    #[test]
    fn notes_blank_is_absent() {
        assert_eq!(parse_notes(None), ParsedNotes::default());
        assert_eq!(parse_notes(Some("   ")), ParsedNotes::default());
    }
}
