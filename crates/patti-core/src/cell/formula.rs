//! `HYPERLINK(...)` formula parsing.

use regex::Regex;
use std::sync::OnceLock;

fn hyperlink_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)HYPERLINK\(\s*"([^"]+)""#).ok())
        .as_ref()
}

/// Returns the literal first argument of a `HYPERLINK` call in `formula`.
///
/// Only a double-quoted literal counts; `=HYPERLINK(B2, "label")` yields `None`.
pub fn hyperlink_target(formula: &str) -> Option<&str> {
    hyperlink_re()?
        .captures(formula)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
