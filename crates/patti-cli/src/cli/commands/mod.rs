//! CLI command handlers, one file per command.

mod completions;
mod config;
mod resolve;
mod run;

pub use completions::run_completions;
pub use config::run_config;
pub use resolve::run_resolve;
pub use run::{run_sheet, RunOverrides};
