//! Cell link interpretation.
//!
//! A spreadsheet can carry the same logical link three ways: as a hyperlink
//! attached to the cell, as a `HYPERLINK("url", "label")` formula, or as plain
//! display text (which may be a bare filename). [`interpret`] collapses those
//! into a single [`LinkDescriptor`] so callers never inspect raw cells.

mod formula;

pub use formula::hyperlink_target;

use crate::share_link;
use std::fmt;

/// Raw value of one spreadsheet cell, as returned by the Sheets API.
///
/// All fields `None` means the cell is absent (no data in that row).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellPayload {
    /// Hyperlink attached to the cell, independent of its text.
    pub hyperlink: Option<String>,
    /// Formula source when the cell was entered as a formula.
    pub formula: Option<String>,
    /// Displayed (formatted) text.
    pub formatted: Option<String>,
}

impl CellPayload {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            formatted: Some(s.into()),
            ..Self::default()
        }
    }

    pub fn is_absent(&self) -> bool {
        self.hyperlink.is_none() && self.formula.is_none() && self.formatted.is_none()
    }
}

/// Normalized link for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDescriptor {
    /// Drive file id extracted from a share link.
    DriveId(String),
    /// Plain `http(s)` URL.
    DirectUrl(String),
    /// Anything else: treated as a Drive filename search key.
    FileName(String),
    Unresolvable,
}

impl LinkDescriptor {
    /// Short label for progress output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LinkDescriptor::DriveId(_) => "drive-id",
            LinkDescriptor::DirectUrl(_) => "direct-url",
            LinkDescriptor::FileName(_) => "file-name",
            LinkDescriptor::Unresolvable => "unresolvable",
        }
    }
}

impl fmt::Display for LinkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkDescriptor::DriveId(id) => write!(f, "DriveId({})", id),
            LinkDescriptor::DirectUrl(u) => write!(f, "DirectUrl({})", u),
            LinkDescriptor::FileName(n) => write!(f, "FileName({})", n),
            LinkDescriptor::Unresolvable => write!(f, "Unresolvable"),
        }
    }
}

/// A descriptor together with the candidate string it was classified from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub candidate: Option<String>,
    pub descriptor: LinkDescriptor,
}

impl ResolvedLink {
    /// True when the candidate itself is fetchable over plain HTTP(S).
    pub fn candidate_is_http(&self) -> bool {
        self.candidate.as_deref().is_some_and(is_http_url)
    }
}

/// Returns true if `s` starts with `http://` or `https://`.
pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Picks the candidate link string from a cell: hyperlink, then formula literal, then text.
pub fn candidate_link(cell: &CellPayload) -> Option<&str> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    if let Some(target) = cell.hyperlink.as_deref().filter(non_blank) {
        return Some(target);
    }
    if let Some(target) = cell
        .formula
        .as_deref()
        .and_then(hyperlink_target)
        .filter(non_blank)
    {
        return Some(target);
    }
    cell.formatted.as_deref().filter(non_blank)
}

/// Classifies a candidate link string.
pub fn classify(candidate: &str) -> LinkDescriptor {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return LinkDescriptor::Unresolvable;
    }
    if let Some(id) = share_link::extract_file_id(Some(candidate)) {
        return LinkDescriptor::DriveId(id);
    }
    if is_http_url(candidate) {
        return LinkDescriptor::DirectUrl(candidate.to_string());
    }
    LinkDescriptor::FileName(candidate.to_string())
}

/// Interprets one cell into a [`ResolvedLink`].
pub fn interpret(cell: &CellPayload) -> ResolvedLink {
    match candidate_link(cell) {
        Some(candidate) => ResolvedLink {
            candidate: Some(candidate.trim().to_string()),
            descriptor: classify(candidate),
        },
        None => ResolvedLink {
            candidate: None,
            descriptor: LinkDescriptor::Unresolvable,
        },
    }
}
