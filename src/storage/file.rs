//! File storage backend
//!
//! One `<site>-data.txt` file per site in the scrape directory holds both the
//! ledger and the page text, using the framed format from [`super::format`].

use crate::storage::format::{decode_records, encode_record, DecodedStore};
use crate::storage::traits::{LinkLedger, PageStore, StorageError, StorageResult};
use crate::storage::{dedup_records, PageRecord};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed ledger and page store
pub struct FileStorage {
    dir: PathBuf,
    /// Visited URLs per site, loaded on first use
    index: HashMap<String, HashSet<String>>,
}

impl FileStorage {
    /// Opens the storage directory, creating it if needed
    pub fn new(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            index: HashMap::new(),
        })
    }

    /// Path of the store file for `site`
    pub fn site_path(&self, site: &str) -> PathBuf {
        site_file(&self.dir, site)
    }

    /// Returns the visited set for `site`, reading and repairing the file once
    fn visited(&mut self, site: &str) -> StorageResult<&mut HashSet<String>> {
        match self.index.entry(site.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let decoded = read_and_repair(&site_file(&self.dir, site), site)?;
                let visited = decoded.records.into_iter().map(|r| r.url).collect();
                Ok(entry.insert(visited))
            }
        }
    }

    /// Appends one frame, rolling the file back if the write fails midway
    fn write_frame(&self, site: &str, frame: &str) -> StorageResult<()> {
        let path = self.site_path(site);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let previous_len = file.metadata()?.len();

        let result = file
            .write_all(frame.as_bytes())
            .and_then(|_| file.sync_data());

        if let Err(e) = result {
            tracing::error!(
                "Write to {} failed, rolling back to {} bytes: {}",
                path.display(),
                previous_len,
                e
            );
            if let Err(rollback) = file.set_len(previous_len) {
                tracing::error!("Rollback of {} failed: {}", path.display(), rollback);
            }
            return Err(e.into());
        }

        Ok(())
    }
}

impl LinkLedger for FileStorage {
    fn load(&mut self, site: &str) -> StorageResult<HashSet<String>> {
        Ok(self.visited(site)?.clone())
    }

    fn exists(&mut self, site: &str, url: &str) -> StorageResult<bool> {
        Ok(self.visited(site)?.contains(url))
    }

    fn record(&mut self, site: &str, url: &str) -> StorageResult<()> {
        if self.visited(site)?.contains(url) {
            return Ok(());
        }

        // A bare ledger entry is a frame with an empty body
        let frame = encode_record(url, "")?;
        self.write_frame(site, &frame)?;
        self.visited(site)?.insert(url.to_string());
        Ok(())
    }
}

impl PageStore for FileStorage {
    fn append(&mut self, site: &str, url: &str, text: &str) -> StorageResult<()> {
        if self.visited(site)?.contains(url) {
            tracing::debug!("{} already stored for {}, skipping append", url, site);
            return Ok(());
        }

        let frame = encode_record(url, text)?;
        self.write_frame(site, &frame)?;
        self.visited(site)?.insert(url.to_string());
        Ok(())
    }

    fn load_pages(&self, site: &str) -> StorageResult<Vec<PageRecord>> {
        let decoded = read_store(&self.site_path(site), site)?;
        Ok(dedup_records(decoded.records))
    }
}

fn site_file(dir: &Path, site: &str) -> PathBuf {
    dir.join(format!("{}-data.txt", site))
}

/// Reads and decodes a store file; a missing file is an empty store
fn read_store(path: &Path, site: &str) -> StorageResult<DecodedStore> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DecodedStore::default()),
        Err(e) => return Err(e.into()),
    };

    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => text,
        // A crash can cut a multi-byte character; decode the valid prefix
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).map_err(|_| StorageError::Encoding {
                site: site.to_string(),
            })?
        }
        Err(_) => {
            return Err(StorageError::Encoding {
                site: site.to_string(),
            })
        }
    };

    let mut decoded = decode_records(text);
    if text.len() < bytes.len() {
        decoded.torn = true;
    }
    Ok(decoded)
}

/// Reads a store file and truncates an incomplete trailing frame
fn read_and_repair(path: &Path, site: &str) -> StorageResult<DecodedStore> {
    let decoded = read_store(path, site)?;

    if decoded.torn {
        tracing::warn!(
            "Store for {} ends in an incomplete record; truncating {} to {} bytes",
            site,
            path.display(),
            decoded.valid_len
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(decoded.valid_len as u64)?;
        file.sync_all()?;
    }

    tracing::debug!(
        "Loaded {} stored pages for {} from {}",
        decoded.records.len(),
        site,
        path.display()
    );

    Ok(decoded)
}
