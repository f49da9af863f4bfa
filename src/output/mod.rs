//! Output module for reports and summaries
//!
//! This module handles:
//! - Rendering processed scholarship records as text
//! - Rendering eligibility evaluations as reports
//! - Printing crawl and store statistics

pub mod report;
pub mod stats;

pub use report::{format_eligibility, format_record};
pub use stats::{load_statistics, print_crawl_summary, print_statistics, SiteStatistics};

use std::path::Path;

/// Writes `contents` to `path`, creating parent directories as needed
pub fn write_report(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
