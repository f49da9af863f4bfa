//! Storage traits and error types
//!
//! The link ledger and the page store are separate contracts even though the
//! file backend keeps both in one framed file per site.

use crate::storage::PageRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL cannot be stored: {0:?}")]
    InvalidUrl(String),

    #[error("Store file for site '{site}' is not valid UTF-8")]
    Encoding { site: String },

    #[error("Write rejected for site '{0}'")]
    WriteRejected(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of every URL visited for a site
pub trait LinkLedger {
    /// Reconstructs the visited set from durable storage
    fn load(&mut self, site: &str) -> StorageResult<HashSet<String>>;

    /// Returns true if `url` has been recorded for `site`
    fn exists(&mut self, site: &str, url: &str) -> StorageResult<bool>;

    /// Records `url` as visited; recording a present URL has no effect
    fn record(&mut self, site: &str, url: &str) -> StorageResult<()>;
}

/// Durable record of page content keyed by URL
pub trait PageStore {
    /// Persists the text of `url`; appending a stored URL has no effect
    fn append(&mut self, site: &str, url: &str, text: &str) -> StorageResult<()>;

    /// Reads back every stored page for `site`, first occurrence per URL
    fn load_pages(&self, site: &str) -> StorageResult<Vec<PageRecord>>;
}

/// Ledger and page store used together by the traversal engine
pub trait SiteStorage: LinkLedger + PageStore {
    /// Stores the page and marks it visited as one unit
    ///
    /// The ledger entry is only made once the content is durable, so a failed
    /// append leaves the URL unvisited and it is fetched again next run.
    fn commit_page(&mut self, site: &str, url: &str, text: &str) -> StorageResult<()> {
        self.append(site, url, text)?;
        self.record(site, url)
    }
}

impl<T: LinkLedger + PageStore> SiteStorage for T {}
