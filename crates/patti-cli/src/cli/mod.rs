//! CLI for patti.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use patti_core::config;
use std::path::PathBuf;

use commands::{run_completions, run_config, run_resolve, run_sheet, RunOverrides};

/// Download the PDF linked from every row of a Google Sheet.
#[derive(Debug, Parser)]
#[command(name = "patti")]
#[command(about = "patti: fetch the PDFs linked from a Google Sheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read the sheet and download one PDF per row.
    Run {
        /// Spreadsheet key; overrides the config file and SPREADSHEET_ID.
        #[arg(long, value_name = "ID")]
        spreadsheet_id: Option<String>,
        /// Sheet (tab) title.
        #[arg(long, value_name = "NAME")]
        sheet: Option<String>,
        /// Sheet (tab) id, the `gid=` in the sheet URL.
        #[arg(long, value_name = "GID", conflicts_with = "sheet")]
        sheet_gid: Option<i64>,
        /// Directory for downloaded PDFs.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Stop after N data rows.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Leave rows whose output file already exists alone.
        #[arg(long)]
        skip_existing: bool,
        /// Do not retry failed Drive share links as plain HTTP GETs.
        #[arg(long)]
        no_drive_fallback: bool,
    },

    /// Show how a link cell would be interpreted, without downloading.
    Resolve {
        /// Cell text (or a HYPERLINK formula with --formula).
        text: String,
        /// Treat TEXT as the cell's formula rather than its display value.
        #[arg(long)]
        formula: bool,
    },

    /// Print the config file path and the effective configuration.
    Config,

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                spreadsheet_id,
                sheet,
                sheet_gid,
                output_dir,
                limit,
                skip_existing,
                no_drive_fallback,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let overrides = RunOverrides {
                    spreadsheet_id,
                    sheet,
                    sheet_gid,
                    output_dir,
                    skip_existing,
                    no_drive_fallback,
                };
                overrides.apply(&mut cfg);
                run_sheet(&cfg, limit)?;
            }
            CliCommand::Resolve { text, formula } => run_resolve(&text, formula),
            CliCommand::Config => run_config()?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
