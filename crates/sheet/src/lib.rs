//! Spreadsheet reading for the import pipeline.
//!
//! Loads a workbook (`.xlsx`, `.xls`, and anything else calamine
//! auto-detects) into an ordered table of header-keyed rows, the raw
//! representation the transformer consumes. Cell values are rendered as
//! text: whole floats lose their trailing `.0`, booleans become
//! `TRUE`/`FALSE`, date cells keep their serial value. Fully empty rows are
//! dropped; row order is otherwise preserved.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use qm_core::record::RawRow;

/// Errors raised while opening or selecting a sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The file is missing, not a spreadsheet, or too corrupt to parse.
    #[error("failed to read spreadsheet: {0}")]
    Unreadable(String),

    /// The workbook parsed but contains no sheets at all.
    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    /// A sheet was requested by name and the workbook has no such sheet.
    #[error("no such sheet: '{0}'")]
    NoSuchSheet(String),
}

/// One loaded sheet: headers in source order plus data rows keyed by header.
#[derive(Debug, Clone)]
pub struct SheetTable {
    /// Name of the sheet that was read.
    pub sheet_name: String,
    /// Column headers from the first row, case preserved. Blank header
    /// cells get positional placeholder names so every column stays
    /// addressable.
    pub headers: Vec<String>,
    /// Data rows in sheet order, fully empty rows removed. Blank cells are
    /// absent from the map.
    pub rows: Vec<RawRow>,
}

impl SheetTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Up to `n` leading rows, for upload previews.
    pub fn sample(&self, n: usize) -> &[RawRow] {
        &self.rows[..self.rows.len().min(n)]
    }
}

/// Read one sheet from the workbook at `path`.
///
/// `sheet` selects by name; `None` reads the first sheet. The first row of
/// the used range is taken as the header row.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<SheetTable, SheetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SheetError::Unreadable(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(SheetError::EmptyWorkbook);
    }

    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|n| n == name) {
                return Err(SheetError::NoSuchSheet(name.to_string()));
            }
            name.to_string()
        }
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::Unreadable(format!("sheet '{sheet_name}': {e}")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| render_cell(cell).unwrap_or_else(|| format!("Column {}", i + 1)))
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for raw in rows_iter {
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(raw.iter()) {
            if let Some(value) = render_cell(cell) {
                row.insert(header.clone(), value);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(SheetTable {
        sheet_name,
        headers,
        rows,
    })
}

/// Render one cell as text; `None` for empty cells.
///
/// Whole floats within i64 range print without a fractional part so that
/// numeric tag columns come out as "1042", not "1042.0". Date cells keep
/// their Excel serial value; ISO-typed cells pass through as text.
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{n}"))
            }
        }
        Data::Int(n) => Some(format!("{n}")),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{e:?}")),
        Data::DateTime(dt) => Some(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
