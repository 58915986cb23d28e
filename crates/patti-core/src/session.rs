//! One end-to-end run: read the sheet, then process every row in order.

use anyhow::{Context, Result};
use std::fs;

use crate::auth::AccessToken;
use crate::config::PattiConfig;
use crate::fetch::{FixedDelay, RemoteFetcher};
use crate::http::HttpClient;
use crate::pipeline::{self, Orchestrator, RowReport, RowSettings};
use crate::report::RunReport;
use crate::sheets::SheetsClient;

/// Per-run knobs that do not live in the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Process at most this many rows (counted from `first_row`).
    pub limit: Option<usize>,
}

/// Runs the whole sheet. `cfg` must already be validated.
///
/// Only failures before the first row is processed are returned as errors
/// (sheet lookup, identifier column, output directory). The output directory
/// exists afterwards even when the sheet has no rows. Per-row problems end
/// up in the returned report and in `on_row`.
pub fn run(
    cfg: &PattiConfig,
    token: &AccessToken,
    opts: RunOptions,
    on_row: &mut dyn FnMut(&RowReport),
) -> Result<RunReport> {
    let spreadsheet_id = cfg
        .spreadsheet_id
        .as_deref()
        .context("spreadsheet_id is not set")?;
    let api = cfg.api();
    let http = HttpClient::new(cfg.http());
    let sheets = SheetsClient::new(&http, token, &api.sheets_base, spreadsheet_id)
        .context("invalid Sheets API base URL")?;

    let sheet = match (&cfg.sheet_name, cfg.sheet_gid) {
        (Some(name), _) => name.clone(),
        (None, Some(gid)) => sheets
            .sheet_title(gid)
            .with_context(|| format!("resolving sheet gid {}", gid))?,
        (None, None) => anyhow::bail!("either sheet_name or sheet_gid must be set"),
    };
    tracing::info!(spreadsheet_id, sheet = %sheet, "starting run");

    let mut ids = sheets
        .read_column_values(&sheet, &cfg.id_column, cfg.first_row)
        .with_context(|| format!("reading identifier column {}", cfg.id_column))?;
    if let Some(limit) = opts.limit {
        ids.truncate(limit);
    }

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output dir {}", cfg.output_dir.display()))?;

    let mut report = RunReport::default();
    if ids.is_empty() {
        tracing::info!(sheet = %sheet, "no rows to process");
        return Ok(report);
    }

    let last_row = cfg.first_row + ids.len() as u32 - 1;
    let cells = sheets.read_link_cells(&sheet, &cfg.link_column, cfg.first_row, last_row);

    let throttle = FixedDelay::from_millis(cfg.throttle().search_delay_ms);
    let fetcher = RemoteFetcher::new(&http, token, &api.drive_base, &throttle)
        .context("invalid Drive API base URL")?;
    let orchestrator = Orchestrator::new(&fetcher, RowSettings::from_config(cfg));

    let rows = pipeline::zip_rows(cfg.first_row, ids, cells);
    tracing::debug!(rows = rows.len(), first_row = cfg.first_row, last_row, "processing rows");
    orchestrator.run(rows, &mut report, on_row);

    tracing::info!(
        succeeded = report.succeeded,
        skipped = report.skipped,
        failed = report.failed,
        "run finished"
    );
    Ok(report)
}
