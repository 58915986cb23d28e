//! `patti config` – show where the config lives and what it resolves to.

use anyhow::Result;
use patti_core::{config, logging};

pub fn run_config() -> Result<()> {
    let path = config::config_path()?;
    let mut cfg = config::load_or_init()?;
    cfg.apply_env();

    println!("config file: {}", path.display());
    match logging::log_file_path() {
        Ok(log) => println!("log file:    {}", log.display()),
        Err(e) => println!("log file:    unavailable ({})", e),
    }
    if let Err(e) = cfg.validate() {
        println!("status:      incomplete ({})", e);
    } else {
        println!("status:      ready");
    }
    println!();
    print!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}
