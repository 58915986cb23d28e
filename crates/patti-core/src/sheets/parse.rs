//! Minimal Sheets v4 response structures.

use serde::Deserialize;
use serde_json::Value;

use crate::cell::CellPayload;

#[derive(Debug, Default, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub properties: Option<SheetProperties>,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Deserialize)]
pub struct SheetProperties {
    #[serde(rename = "sheetId")]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridData {
    #[serde(default, rename = "rowData")]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CellData {
    #[serde(default)]
    pub hyperlink: Option<String>,
    #[serde(default, rename = "formattedValue")]
    pub formatted_value: Option<String>,
    #[serde(default, rename = "userEnteredValue")]
    pub user_entered_value: Option<ExtendedValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtendedValue {
    #[serde(default, rename = "formulaValue")]
    pub formula_value: Option<String>,
}

impl From<CellData> for CellPayload {
    fn from(c: CellData) -> Self {
        CellPayload {
            hyperlink: c.hyperlink,
            formula: c.user_entered_value.and_then(|v| v.formula_value),
            formatted: c.formatted_value,
        }
    }
}

/// `spreadsheets.values.get` response.
#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Flattens the first grid of a single-column read into one payload per row.
///
/// The API drops trailing empty rows and empty cells, so the result is padded
/// with absent payloads up to `expected_rows` (and truncated to it).
pub fn cells_from_spreadsheet(doc: Spreadsheet, expected_rows: usize) -> Vec<CellPayload> {
    let rows = doc
        .sheets
        .into_iter()
        .next()
        .and_then(|s| s.data.into_iter().next())
        .map(|g| g.row_data)
        .unwrap_or_default();

    let mut cells: Vec<CellPayload> = rows
        .into_iter()
        .take(expected_rows)
        .map(|r| {
            r.values
                .into_iter()
                .next()
                .map(CellPayload::from)
                .unwrap_or_default()
        })
        .collect();
    cells.resize(expected_rows, CellPayload::absent());
    cells
}

/// First column of a `majorDimension=COLUMNS` value range, as display strings.
pub fn first_column(range: ValueRange) -> Vec<String> {
    range
        .values
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}
