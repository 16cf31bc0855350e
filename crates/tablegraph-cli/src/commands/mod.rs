//! Command implementations.

pub mod config;
pub mod describe;
pub mod extract;

pub use config::{execute_config_init, execute_config_show};
pub use describe::execute_describe;
pub use extract::execute_extract;

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use tablegraph_domain::TableChunk;

/// Read one table chunk or an array of them from a JSON file.
pub fn read_chunks(path: &Path) -> Result<Vec<TableChunk>> {
    let contents = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;

    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(CliError::InvalidInput(format!(
            "{} must hold a table chunk object or an array of them",
            path.display()
        ))),
    }
}
