//! Output module for the link inventory
//!
//! This module handles:
//! - Writing the per-category inventory as JSON
//! - Flattening the inventory into detail-fetch tasks
//! - Recording and printing run statistics

mod handoff;
mod inventory;
pub mod stats;

pub use handoff::{detail_tasks, extract_item_id, write_detail_tasks, DetailTask};
pub use inventory::{format_inventory, write_inventory};
pub use stats::{print_statistics, RunStatistics};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
