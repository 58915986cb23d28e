//! Output filenames derived from row identifiers.

use std::path::{Path, PathBuf};

/// Sanitizes a row identifier for use inside a filename.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing spaces and dots
/// - Limits length to 200 bytes so prefix and extension still fit NAME_MAX
pub fn sanitize_id(id: &str) -> String {
    const MAX_ID: usize = 200;

    let replaced: String = id
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    if trimmed.len() > MAX_ID {
        let mut take = MAX_ID;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<dir>/<prefix><id>.pdf`
pub fn output_path(dir: &Path, prefix: &str, id: &str) -> PathBuf {
    dir.join(format!("{}{}.pdf", prefix, sanitize_id(id)))
}
