//! JSON link inventory

use crate::crawler::CategoryResult;
use crate::output::OutputResult;
use std::fs;
use std::path::Path;

/// Formats the inventory as pretty-printed JSON
///
/// Non-ASCII category names are written verbatim.
pub fn format_inventory(results: &[CategoryResult]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Writes the inventory to `path`, creating parent directories
///
/// # Arguments
///
/// * `results` - One entry per category, in enumeration order
/// * `path` - Destination file, overwritten if present
pub fn write_inventory(results: &[CategoryResult], path: &Path) -> OutputResult<()> {
    let json = format_inventory(results)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;

    Ok(())
}
