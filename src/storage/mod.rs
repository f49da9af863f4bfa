//! Storage module for persisting crawl data
//!
//! This module handles the per-site link ledger and page store, including:
//! - The framed append-only file format
//! - A file backend with one store file per site
//! - An in-memory backend with the same semantics

pub mod format;
mod file;
mod memory;
mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{LinkLedger, PageStore, SiteStorage, StorageError, StorageResult};

/// A stored page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub text: String,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Keeps the first record for each URL, preserving order
pub(crate) fn dedup_records(records: Vec<PageRecord>) -> Vec<PageRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.url.clone()))
        .collect()
}
