//! Handoff to the detail-fetch stage
//!
//! The detail fetcher consumes flat `(url, category)` pairs. Each task also
//! carries the document's `ItemID`, which names the files that stage saves.

use crate::crawler::CategoryResult;
use crate::output::OutputResult;
use serde::Serialize;
use std::fs;
use std::path::Path;
use url::Url;

/// One document page for the detail fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailTask {
    pub url: String,

    #[serde(rename = "loaivanban")]
    pub category: String,

    /// Numeric `ItemID` of the document, when the URL carries one
    pub item_id: Option<String>,
}

/// Flattens the inventory into detail-fetch tasks
///
/// Tasks follow category order, then link order within a category.
pub fn detail_tasks(results: &[CategoryResult]) -> Vec<DetailTask> {
    results
        .iter()
        .flat_map(|result| {
            result.links.iter().map(|url| DetailTask {
                url: url.clone(),
                category: result.category_name.clone(),
                item_id: extract_item_id(url),
            })
        })
        .collect()
}

/// Reads the numeric `ItemID` query parameter of a document URL
pub fn extract_item_id(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let (_, value) = url.query_pairs().find(|(key, _)| key == "ItemID")?;
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Writes the detail-fetch tasks as JSON and returns how many were written
pub fn write_detail_tasks(results: &[CategoryResult], path: &Path) -> OutputResult<usize> {
    let tasks = detail_tasks(results);
    let json = serde_json::to_string_pretty(&tasks)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;

    Ok(tasks.len())
}
