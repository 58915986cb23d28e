//! Google Sheets v4 reads.
//!
//! Link cells are fetched with one ranged `spreadsheets.get` per run instead
//! of one request per row, which keeps the run at O(1) Sheets calls under
//! per-user rate limits.

pub mod a1;
pub mod parse;

use thiserror::Error;

use crate::auth::AccessToken;
use crate::cell::CellPayload;
use crate::http::{self, HttpClient, HttpError};
use parse::{Spreadsheet, ValueRange};

/// Field mask for link cells: hyperlink target, formula and display text only.
pub const LINK_FIELDS: &str =
    "sheets(data(rowData(values(hyperlink,formattedValue,userEnteredValue))))";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("malformed Sheets response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no sheet with gid {0} in spreadsheet")]
    SheetNotFound(i64),
}

/// Sheets client bound to one spreadsheet.
pub struct SheetsClient<'a> {
    http: &'a HttpClient,
    token: &'a AccessToken,
    base: url::Url,
    spreadsheet_id: String,
}

impl<'a> SheetsClient<'a> {
    pub fn new(
        http: &'a HttpClient,
        token: &'a AccessToken,
        base: &str,
        spreadsheet_id: &str,
    ) -> Result<Self, SheetsError> {
        Ok(Self {
            http,
            token,
            base: http::validate_url(base)?,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    fn endpoint(&self, extra: &[&str]) -> Result<url::Url, SheetsError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet_id)
            .extend(extra);
        Ok(url)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &url::Url) -> Result<T, SheetsError> {
        let resp = self.http.get(url, &[self.token.bearer_header()])?;
        tracing::debug!(status = resp.status, bytes = resp.body.len(), "sheets response");
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// Title of the tab whose id (`gid`) is `gid`.
    pub fn sheet_title(&self, gid: i64) -> Result<String, SheetsError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets(properties(sheetId,title))");
        let doc: Spreadsheet = self.get_json(&url)?;
        doc.sheets
            .into_iter()
            .filter_map(|s| s.properties)
            .find(|p| p.sheet_id == gid)
            .map(|p| p.title)
            .ok_or(SheetsError::SheetNotFound(gid))
    }

    /// Display values of `column` from `first_row` down to the last non-empty row.
    pub fn read_column_values(
        &self,
        sheet: &str,
        column: &str,
        first_row: u32,
    ) -> Result<Vec<String>, SheetsError> {
        let range = a1::open_column_range(sheet, column, first_row);
        let mut url = self.endpoint(&["values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "COLUMNS");
        let values: ValueRange = self.get_json(&url)?;
        Ok(parse::first_column(values))
    }

    /// Link cells of `column` for rows `start..=end`, one payload per row.
    pub fn try_read_link_cells(
        &self,
        sheet: &str,
        column: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<CellPayload>, SheetsError> {
        if end < start {
            return Ok(Vec::new());
        }
        let range = a1::column_range(sheet, column, start, end);
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("ranges", &range)
            .append_pair("includeGridData", "true")
            .append_pair("fields", LINK_FIELDS);
        let doc: Spreadsheet = self.get_json(&url)?;
        Ok(parse::cells_from_spreadsheet(doc, (end - start + 1) as usize))
    }

    /// Like [`try_read_link_cells`](Self::try_read_link_cells) but degrades to
    /// an empty sequence on failure: the run continues with no links.
    pub fn read_link_cells(&self, sheet: &str, column: &str, start: u32, end: u32) -> Vec<CellPayload> {
        match self.try_read_link_cells(sheet, column, start, end) {
            Ok(cells) => {
                tracing::debug!(rows = cells.len(), "read link cells");
                cells
            }
            Err(e) => {
                tracing::warn!(
                    sheet,
                    column,
                    start,
                    end,
                    "link range read failed, continuing without links: {}",
                    e
                );
                Vec::new()
            }
        }
    }
}
