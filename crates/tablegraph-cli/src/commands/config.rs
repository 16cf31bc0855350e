//! Config command implementation.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::{Path, PathBuf};

/// Print the active configuration as TOML.
pub fn execute_config_show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write the default configuration to `path`, or to the default location.
pub fn execute_config_init(path: Option<&Path>, force: bool, formatter: &Formatter) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::path()?,
    };
    let written = write_default(&path, force)?;
    println!("{}", formatter.success(&format!("Wrote {}", written.display())));
    Ok(())
}

fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }
    Config::default().save_to(path)?;
    Ok(path.to_path_buf())
}
