//! Stored-name handling for uploaded spreadsheets.
//!
//! Uploads land in one flat directory. A stored name is
//! `{millis}_{sanitized original}`, and anything a client hands back as a
//! stored name must resolve to a direct child of that directory.

use std::path::{Path, PathBuf};

use crate::error::AppError;

/// File extensions accepted for upload, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Whether the original filename carries an accepted spreadsheet extension.
pub fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps alphanumerics, `.`, `-`, and `_`; everything else becomes `_`.
/// Dot runs are collapsed and edge dots stripped so the result can never be
/// a dotfile or contain `..` (which [`resolve_stored`] would reject).
pub fn sanitize_filename(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Server-side name for an upload: `{millis}_{sanitized}`.
pub fn stored_name(original: &str, now_millis: i64) -> String {
    format!("{now_millis}_{}", sanitize_filename(original))
}

/// Resolve a stored name back to a path under the upload directory.
///
/// Rejects anything that is not a plain child name: separators, `..`, empty.
pub fn resolve_stored(upload_dir: &Path, stored: &str) -> Result<PathBuf, AppError> {
    if stored.is_empty()
        || stored.contains('/')
        || stored.contains('\\')
        || stored.contains("..")
    {
        return Err(AppError::BadRequest(format!(
            "invalid stored filename: {stored}"
        )));
    }
    Ok(upload_dir.join(stored))
}
