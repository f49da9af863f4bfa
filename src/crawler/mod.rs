//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing, text and link extraction
//! - The deduplicating breadth-first frontier
//! - Per-site crawl coordination with iteration and depth bounds

mod coordinator;
mod fetcher;
mod filter;
mod frontier;
mod parser;

pub use coordinator::{
    run_crawl, Coordinator, CrawlOutcome, CrawlSettings, CrawlStatus, StopReason,
};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use filter::has_excluded_extension;
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, ParsedPage};
