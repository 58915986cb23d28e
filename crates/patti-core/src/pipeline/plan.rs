//! Strategy order for one resolved link.

use std::fmt;

use crate::cell::{LinkDescriptor, ResolvedLink};

/// One retrieval attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    DriveId(String),
    DirectUrl(String),
    Search(String),
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::DriveId(_) => "drive",
            Strategy::DirectUrl(_) => "direct",
            Strategy::Search(_) => "search",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DriveId(id) => write!(f, "drive id {}", id),
            Strategy::DirectUrl(url) => write!(f, "direct {}", url),
            Strategy::Search(name) => write!(f, "search {:?}", name),
        }
    }
}

/// Attempts to make for `link`, in order; the first success ends the row.
///
/// A Drive id whose candidate is itself an `http(s)` URL gets a direct GET as
/// second attempt when `drive_fallback` is set. Every other descriptor maps to
/// exactly one strategy; `Unresolvable` maps to none.
pub fn plan(link: &ResolvedLink, drive_fallback: bool) -> Vec<Strategy> {
    match &link.descriptor {
        LinkDescriptor::DriveId(id) => {
            let mut steps = vec![Strategy::DriveId(id.clone())];
            if drive_fallback && link.candidate_is_http() {
                if let Some(candidate) = &link.candidate {
                    steps.push(Strategy::DirectUrl(candidate.clone()));
                }
            }
            steps
        }
        LinkDescriptor::DirectUrl(url) => vec![Strategy::DirectUrl(url.clone())],
        LinkDescriptor::FileName(name) => vec![Strategy::Search(name.clone())],
        LinkDescriptor::Unresolvable => Vec::new(),
    }
}
