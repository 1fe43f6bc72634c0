//! Row transformation: apply an accepted column mapping plus the field
//! normalizers to turn one raw spreadsheet row into a canonical
//! [`AssetRecord`].

use crate::mapping::ColumnMapping;
use crate::normalize::{clean_asset_tag, normalize_department, normalize_status, parse_notes};
use crate::record::{AssetRecord, RawRow};

/// Transform one raw row using the accepted mapping.
///
/// Unmapped fields and blank cells come out as `None`. Coupling rules, in
/// order:
///
/// - a mapped department value is normalized;
/// - if the notes value parses into a user name and no assigned-user value
///   was mapped, the parsed name is adopted as `assigned_user_name` (a
///   parsed secondary tag is extracted by the parser but never overrides
///   the mapped asset tag: explicit mapping wins over inferred values);
/// - the asset tag is cleaned (trimmed, uppercased);
/// - `status` always resolves to a canonical value, defaulting to active;
/// - a missing `computer_name` falls back to the cleaned asset tag.
///
/// Pure: reads nothing but its arguments, never touches the catalog.
pub fn transform_row(row: &RawRow, mapping: &ColumnMapping) -> AssetRecord {
    let asset_tag = clean_asset_tag(cell(row, &mapping.asset_tag).as_deref());
    let department = normalize_department(cell(row, &mapping.department).as_deref());
    let status = normalize_status(cell(row, &mapping.status).as_deref())
        .as_str()
        .to_string();

    let notes = cell(row, &mapping.notes);
    let mut assigned_user_name = cell(row, &mapping.assigned_user_name);
    if assigned_user_name.is_none() {
        assigned_user_name = parse_notes(notes.as_deref()).user_name;
    }

    let mut computer_name = cell(row, &mapping.computer_name);
    if computer_name.is_none() {
        computer_name = asset_tag.clone();
    }

    AssetRecord {
        asset_tag,
        computer_name,
        serial_number: cell(row, &mapping.serial_number),
        department,
        assigned_user_name,
        assigned_user_id: cell(row, &mapping.assigned_user_id),
        operating_system: cell(row, &mapping.operating_system),
        notes,
        status,
    }
}

/// Transform a whole sheet, preserving row order.
pub fn transform_rows(rows: &[RawRow], mapping: &ColumnMapping) -> Vec<AssetRecord> {
    rows.iter().map(|row| transform_row(row, mapping)).collect()
}

/// Raw cell value for a mapped header; blank cells count as absent.
fn cell(row: &RawRow, source: &Option<String>) -> Option<String> {
    source
        .as_ref()
        .and_then(|header| row.get(header))
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
