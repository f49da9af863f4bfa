//! In-memory storage backend
//!
//! Same semantics as the file backend without touching disk. Appends can be
//! made to fail on demand to exercise the commit failure path.

use crate::storage::traits::{LinkLedger, PageStore, StorageError, StorageResult};
use crate::storage::{dedup_records, PageRecord};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    pages: HashMap<String, Vec<PageRecord>>,
    visited: HashMap<String, HashSet<String>>,
    failing_urls: HashSet<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every append of `url` fail
    pub fn fail_appends_for(&mut self, url: impl Into<String>) {
        self.failing_urls.insert(url.into());
    }

    /// Number of page entries stored for `site`, duplicates included
    pub fn page_count(&self, site: &str) -> usize {
        self.pages.get(site).map_or(0, Vec::len)
    }
}

impl LinkLedger for MemoryStorage {
    fn load(&mut self, site: &str) -> StorageResult<HashSet<String>> {
        Ok(self.visited.get(site).cloned().unwrap_or_default())
    }

    fn exists(&mut self, site: &str, url: &str) -> StorageResult<bool> {
        Ok(self
            .visited
            .get(site)
            .map_or(false, |visited| visited.contains(url)))
    }

    fn record(&mut self, site: &str, url: &str) -> StorageResult<()> {
        self.visited
            .entry(site.to_string())
            .or_default()
            .insert(url.to_string());
        Ok(())
    }
}

impl PageStore for MemoryStorage {
    fn append(&mut self, site: &str, url: &str, text: &str) -> StorageResult<()> {
        if self.failing_urls.contains(url) {
            return Err(StorageError::WriteRejected(site.to_string()));
        }

        let pages = self.pages.entry(site.to_string()).or_default();
        if pages.iter().any(|page| page.url == url) {
            return Ok(());
        }
        pages.push(PageRecord::new(url, text));
        Ok(())
    }

    fn load_pages(&self, site: &str) -> StorageResult<Vec<PageRecord>> {
        Ok(dedup_records(
            self.pages.get(site).cloned().unwrap_or_default(),
        ))
    }
}
