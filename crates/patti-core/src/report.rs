//! Run summary: outcome counters and the final output directory listing.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::pipeline::DownloadOutcome;
use crate::storage::PART_SUFFIX;

/// Outcome counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success { .. } => self.succeeded += 1,
            DownloadOutcome::Skipped(_) => self.skipped += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// A file found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub bytes: u64,
}

/// Regular files in `dir` with their sizes, sorted by name.
///
/// Leftover `.part` files are not results and are left out. A missing
/// directory lists as empty.
pub fn list_output_dir(dir: &Path) -> io::Result<Vec<FileEntry>> {
    let read = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in read {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(PART_SUFFIX) {
            continue;
        }
        files.push(FileEntry {
            name,
            bytes: meta.len(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Final human-readable summary: counts, then the listing or a hint block.
pub fn render_summary(report: &RunReport, dir: &Path, files: &[FileEntry]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Done: {} downloaded, {} skipped, {} failed ({} rows)",
        report.succeeded,
        report.skipped,
        report.failed,
        report.total()
    );
    let _ = writeln!(out, "{}", rule);

    if files.is_empty() {
        let _ = writeln!(out, "\n⚠ {} is empty. Things to check:", dir.display());
        let _ = writeln!(out, "  - the link column and first row match the sheet layout");
        let _ = writeln!(out, "  - the token can read both the spreadsheet and the Drive files");
        let _ = writeln!(out, "  - filename cells match a PDF name in Drive exactly");
        let _ = writeln!(out, "  - the log file has the per-row causes (RUST_LOG=debug for more)");
    } else {
        let _ = writeln!(out, "\nFiles in {}:", dir.display());
        for f in files {
            let _ = writeln!(out, "  - {} ({:.1} KB)", f.name, f.bytes as f64 / 1024.0);
        }
    }
    out
}

/// Lists `dir` and renders the summary; listing errors are reported inline.
pub fn summarize(report: &RunReport, dir: &Path) -> String {
    match list_output_dir(dir) {
        Ok(files) => render_summary(report, dir, &files),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "could not list output dir: {}", e);
            let mut out = render_summary(report, dir, &[]);
            let _ = writeln!(out, "  (listing failed: {})", e);
            out
        }
    }
}
