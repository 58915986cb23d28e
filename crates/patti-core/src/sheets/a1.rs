//! A1-notation range helpers.

/// Quotes a sheet title for use in a range (`'My Sheet'`, inner quotes doubled).
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Closed single-column range: `'Sheet'!AF3:AF10`.
pub fn column_range(sheet: &str, column: &str, start: u32, end: u32) -> String {
    format!(
        "{}!{col}{}:{col}{}",
        quote_sheet_name(sheet),
        start,
        end,
        col = column.to_ascii_uppercase()
    )
}

/// Open-ended single-column range from `start` down: `'Sheet'!A3:A`.
pub fn open_column_range(sheet: &str, column: &str, start: u32) -> String {
    format!(
        "{}!{col}{}:{col}",
        quote_sheet_name(sheet),
        start,
        col = column.to_ascii_uppercase()
    )
}
