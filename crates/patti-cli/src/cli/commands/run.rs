//! `patti run` – read the sheet and download every row's PDF.

use anyhow::Result;
use patti_core::auth;
use patti_core::config::PattiConfig;
use patti_core::pipeline::RowReport;
use patti_core::report;
use patti_core::session::{self, RunOptions};
use std::path::PathBuf;
use std::time::Instant;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub spreadsheet_id: Option<String>,
    pub sheet: Option<String>,
    pub sheet_gid: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub skip_existing: bool,
    pub no_drive_fallback: bool,
}

impl RunOverrides {
    /// Layers env (`SPREADSHEET_ID`) and then flags over `cfg`.
    pub fn apply(self, cfg: &mut PattiConfig) {
        cfg.apply_env();
        if let Some(id) = self.spreadsheet_id {
            cfg.spreadsheet_id = Some(id);
        }
        if let Some(name) = self.sheet {
            cfg.sheet_name = Some(name);
        }
        if let Some(gid) = self.sheet_gid {
            cfg.sheet_name = None;
            cfg.sheet_gid = Some(gid);
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if self.skip_existing {
            cfg.skip_existing = true;
        }
        if self.no_drive_fallback {
            cfg.drive_fallback_to_direct = false;
        }
    }
}

/// Exits non-zero only for configuration, auth and sheet-level failures;
/// rows that fail are reported and counted.
pub fn run_sheet(cfg: &PattiConfig, limit: Option<usize>) -> Result<()> {
    cfg.validate()?;
    let token = auth::resolve_token(&cfg.auth())?;

    let started = Instant::now();
    let report = session::run(cfg, &token, RunOptions { limit }, &mut |row: &RowReport| {
        println!("{}", row.progress_line());
    })?;

    print!("{}", report::summarize(&report, &cfg.output_dir));
    println!(
        "\n{} PDF(s) downloaded in {:.1}s",
        report.succeeded,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
