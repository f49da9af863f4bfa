//! Statistics generation from the per-site stores
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer and from crawl outcomes.

use crate::config::SiteRegistry;
use crate::crawler::{CrawlOutcome, CrawlStatus};
use crate::storage::{LinkLedger, PageStore, StorageError};

/// Stored totals for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatistics {
    /// Site name from the registry
    pub site: String,

    /// Number of URLs in the visited ledger
    pub visited: usize,

    /// Number of stored pages
    pub pages: usize,

    /// Total characters of stored page text
    pub text_chars: usize,
}

/// Loads statistics for every registered site
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `registry` - The sites to report on
///
/// # Returns
///
/// * `Ok(Vec<SiteStatistics>)` - One entry per site, in registry order
/// * `Err(StorageError)` - A store could not be read
pub fn load_statistics<S>(
    storage: &mut S,
    registry: &SiteRegistry,
) -> Result<Vec<SiteStatistics>, StorageError>
where
    S: LinkLedger + PageStore,
{
    let mut stats = Vec::with_capacity(registry.len());
    for site in registry {
        let visited = storage.load(&site.name)?.len();
        let pages = storage.load_pages(&site.name)?;
        stats.push(SiteStatistics {
            site: site.name.clone(),
            visited,
            pages: pages.len(),
            text_chars: pages.iter().map(|page| page.text.chars().count()).sum(),
        });
    }
    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &[SiteStatistics]) {
    println!("=== Store Statistics ===\n");

    for entry in stats {
        println!("{}:", entry.site);
        println!("  Visited URLs: {}", entry.visited);
        println!("  Stored pages: {}", entry.pages);
        println!("  Text characters: {}", entry.text_chars);
        println!();
    }

    let visited: usize = stats.iter().map(|s| s.visited).sum();
    let pages: usize = stats.iter().map(|s| s.pages).sum();
    println!(
        "Total: {} visited URLs, {} stored pages across {} sites",
        visited,
        pages,
        stats.len()
    );
}

/// Prints one summary line per crawled site
pub fn print_crawl_summary(outcomes: &[CrawlOutcome]) {
    println!("=== Crawl Summary ===\n");

    for outcome in outcomes {
        let status = match &outcome.status {
            CrawlStatus::Completed => "completed".to_string(),
            CrawlStatus::BoundedStop(reason) => format!("stopped ({:?})", reason),
            CrawlStatus::Cancelled => "cancelled".to_string(),
        };
        println!(
            "  {}: {} after {} iterations, {} saved, {} failed, {} skipped, {} pending ({:.1}s)",
            outcome.site,
            status,
            outcome.iterations,
            outcome.pages_saved,
            outcome.failures,
            outcome.skipped,
            outcome.frontier.len(),
            outcome.elapsed.as_secs_f64()
        );
    }

    let saved: u32 = outcomes.iter().map(|o| o.pages_saved).sum();
    println!("\nTotal pages saved: {}", saved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Site;
    use crate::storage::{MemoryStorage, SiteStorage};

    #[test]
    fn test_load_statistics() {
        let registry = SiteRegistry::new(vec![
            Site::new("alpha", "https://alpha.edu/"),
            Site::new("beta", "https://beta.edu/"),
        ]);

        let mut storage = MemoryStorage::new();
        storage
            .commit_page("alpha", "https://alpha.edu/", "hello")
            .unwrap();
        storage
            .commit_page("alpha", "https://alpha.edu/a", "wörld")
            .unwrap();
        storage.record("beta", "https://beta.edu/").unwrap();

        let stats = load_statistics(&mut storage, &registry).unwrap();
        assert_eq!(
            stats,
            vec![
                SiteStatistics {
                    site: "alpha".to_string(),
                    visited: 2,
                    pages: 2,
                    text_chars: 10,
                },
                SiteStatistics {
                    site: "beta".to_string(),
                    visited: 1,
                    pages: 0,
                    text_chars: 0,
                },
            ]
        );
    }
}
