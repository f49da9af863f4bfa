//! Frontier queue of discovered URLs
//!
//! The frontier is a FIFO, so every link found on a page is queued behind
//! the links found before it and the crawl proceeds breadth-first.

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,

    /// Breadth-first level relative to the seed (the seed is level 0)
    pub level: u32,
}

/// Deduplicating FIFO of URLs for one site crawl
///
/// A URL is accepted at most once per crawl. Popping does not make a URL
/// eligible again, so a page whose fetch failed is not retried until the
/// next run.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` unless it was queued before in this crawl or is visited
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: &str, level: u32, visited: &HashSet<String>) -> bool {
        if visited.contains(url) || self.seen.contains(url) {
            return false;
        }

        self.seen.insert(url.to_string());
        self.queue.push_back(FrontierEntry {
            url: url.to_string(),
            level,
        });
        true
    }

    /// Takes the oldest queued URL
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// URLs still waiting, in fetch order
    pub fn pending_urls(&self) -> Vec<String> {
        self.queue.iter().map(|entry| entry.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
