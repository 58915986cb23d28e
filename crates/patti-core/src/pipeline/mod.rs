//! Per-row download orchestration.
//!
//! Each row goes `Start → Interpreted → attempts (see [`plan`]) → Succeeded |
//! Exhausted`. Rows are processed strictly in order on the calling thread and
//! every failure is turned into a recorded outcome at the row boundary, so one
//! bad row never stops the rows after it.

mod plan;

pub use plan::{plan, Strategy};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::cell::{self, CellPayload, ResolvedLink};
use crate::config::PattiConfig;
use crate::fetch::Fetcher;
use crate::naming;
use crate::report::RunReport;

/// Validated row identifier: non-empty and not the header sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowId(String);

impl RowId {
    pub fn parse(raw: &str, header_sentinel: &str) -> Option<Self> {
        let id = raw.trim();
        if id.is_empty() || id == header_sentinel.trim() || naming::sanitize_id(id).is_empty() {
            return None;
        }
        Some(RowId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyId,
    NoLink,
    /// Output already present and `skip_existing` is on.
    Exists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::EmptyId => "empty id",
            SkipReason::NoLink => "no link",
            SkipReason::Exists => "exists",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { path: PathBuf, bytes: u64 },
    Skipped(SkipReason),
    /// Every planned strategy failed; carries the last cause.
    Failed(String),
}

/// One strategy attempt and its error, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: Strategy,
    pub error: Option<String>,
}

/// Everything that happened to one row.
#[derive(Debug, Clone)]
pub struct RowReport {
    pub row: u32,
    pub id: String,
    pub link: Option<ResolvedLink>,
    pub attempts: Vec<Attempt>,
    pub outcome: DownloadOutcome,
}

impl RowReport {
    /// One-line progress text: row, identifier, strategy, result.
    pub fn progress_line(&self) -> String {
        let strategy = self
            .attempts
            .iter()
            .map(|a| a.strategy.label())
            .collect::<Vec<_>>()
            .join("→");
        let strategy = if strategy.is_empty() { "-".to_string() } else { strategy };
        let result = match &self.outcome {
            DownloadOutcome::Success { path, bytes } => {
                format!("✓ {} ({} bytes)", path.display(), bytes)
            }
            DownloadOutcome::Skipped(reason) => format!("skipped: {}", reason),
            DownloadOutcome::Failed(cause) => format!("✗ {}", cause),
        };
        format!("row {:>4}  id={:<12} [{}] {}", self.row, self.id, strategy, result)
    }
}

/// Input for one row.
#[derive(Debug, Clone)]
pub struct Row {
    pub number: u32,
    pub id: String,
    pub cell: CellPayload,
}

/// Pairs identifiers with link cells, numbering rows from `first_row`.
///
/// `cells` may be shorter than `ids` (e.g. empty after a failed range read);
/// missing cells are absent.
pub fn zip_rows(first_row: u32, ids: Vec<String>, cells: Vec<CellPayload>) -> Vec<Row> {
    let mut cells = cells.into_iter();
    ids.into_iter()
        .zip(first_row..)
        .map(|(id, number)| Row {
            number,
            id,
            cell: cells.next().unwrap_or_default(),
        })
        .collect()
}

/// Row-level settings, taken from the config once per run.
#[derive(Debug, Clone)]
pub struct RowSettings {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub header_sentinel: String,
    pub skip_existing: bool,
    pub drive_fallback: bool,
}

impl RowSettings {
    pub fn from_config(cfg: &PattiConfig) -> Self {
        Self {
            output_dir: cfg.output_dir.clone(),
            file_prefix: cfg.file_prefix.clone(),
            header_sentinel: cfg.header_sentinel.clone(),
            skip_existing: cfg.skip_existing,
            drive_fallback: cfg.drive_fallback_to_direct,
        }
    }
}

pub struct Orchestrator<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    settings: RowSettings,
}

impl<'a, F: Fetcher + ?Sized> Orchestrator<'a, F> {
    pub fn new(fetcher: &'a F, settings: RowSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Processes one row. Never fails: every error ends up in the outcome.
    pub fn process_row(&self, row: &Row) -> RowReport {
        let mut report = RowReport {
            row: row.number,
            id: row.id.trim().to_string(),
            link: None,
            attempts: Vec::new(),
            outcome: DownloadOutcome::Skipped(SkipReason::EmptyId),
        };

        let Some(id) = RowId::parse(&row.id, &self.settings.header_sentinel) else {
            tracing::debug!(row = row.number, "skipping row without identifier");
            return report;
        };

        let link = cell::interpret(&row.cell);
        let steps = plan(&link, self.settings.drive_fallback);
        report.link = Some(link);
        if steps.is_empty() {
            report.outcome = DownloadOutcome::Skipped(SkipReason::NoLink);
            return report;
        }

        let destination = naming::output_path(
            &self.settings.output_dir,
            &self.settings.file_prefix,
            id.as_str(),
        );
        if self.settings.skip_existing && destination.exists() {
            report.outcome = DownloadOutcome::Skipped(SkipReason::Exists);
            return report;
        }

        let mut last_error = String::new();
        for strategy in steps {
            match self.attempt(&strategy, &destination) {
                Ok(bytes) => {
                    tracing::info!(row = row.number, id = id.as_str(), %strategy, bytes, "downloaded");
                    report.attempts.push(Attempt {
                        strategy,
                        error: None,
                    });
                    report.outcome = DownloadOutcome::Success {
                        path: destination,
                        bytes,
                    };
                    return report;
                }
                Err(cause) => {
                    tracing::warn!(row = row.number, id = id.as_str(), %strategy, "attempt failed: {}", cause);
                    last_error = cause.clone();
                    report.attempts.push(Attempt {
                        strategy,
                        error: Some(cause),
                    });
                }
            }
        }

        report.outcome = DownloadOutcome::Failed(last_error);
        report
    }

    /// Runs one strategy, turning errors and panics into a cause string.
    fn attempt(&self, strategy: &Strategy, destination: &Path) -> Result<u64, String> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| match strategy {
            Strategy::DriveId(id) => self.fetcher.fetch_drive_id(id, destination),
            Strategy::DirectUrl(url) => self.fetcher.fetch_direct(url, destination),
            Strategy::Search(name) => self.fetcher.search_and_fetch(name, destination),
        }));
        match result {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => {
                tracing::debug!(kind = ?e.kind(), "strategy error");
                Err(e.to_string())
            }
            Err(payload) => Err(format!("strategy panicked: {}", panic_message(&*payload))),
        }
    }

    /// Processes `rows` in order, recording each outcome and handing each
    /// report to `on_row` as soon as it is known.
    pub fn run<I>(&self, rows: I, report: &mut RunReport, on_row: &mut dyn FnMut(&RowReport))
    where
        I: IntoIterator<Item = Row>,
    {
        for row in rows {
            let row_report = self.process_row(&row);
            report.record(&row_report.outcome);
            on_row(&row_report);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
