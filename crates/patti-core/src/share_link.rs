//! Drive file id extraction from share-link URLs.
//!
//! Drive hands out several link shapes for the same file (`/file/d/<id>/view`,
//! `open?id=<id>`, `uc?id=<id>&export=download`, ...). Patterns are tried in
//! order and the first capture wins.

use regex::Regex;
use std::sync::OnceLock;

/// Share-link shapes, in match order.
const PATTERNS: [&str; 4] = [
    r"/d/([A-Za-z0-9_-]+)",
    r"id=([A-Za-z0-9_-]+)",
    r"/file/d/([A-Za-z0-9_-]+)",
    r"open\?id=([A-Za-z0-9_-]+)",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern = p, "invalid share-link pattern: {}", e);
                    None
                }
            })
            .collect()
    })
}

/// Returns the Drive file id embedded in `link`, if it matches a known share-link shape.
///
/// Absent input yields `None`.
pub fn extract_file_id(link: Option<&str>) -> Option<String> {
    let link = link?;
    patterns().iter().find_map(|re| {
        re.captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    })
}
