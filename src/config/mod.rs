//! Configuration module for Scholar-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and exposes the static site registry the crawler walks.
//!
//! # Example
//!
//! ```no_run
//! use scholar_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will stop after {} fetches", config.crawler.max_iterations);
//! ```

mod parser;
mod registry;
mod types;
mod validation;

// Re-export types
pub use registry::SiteRegistry;
pub use types::{
    Config, CrawlerConfig, DepthMode, ExtractionConfig, OutputConfig, Site, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

impl Config {
    /// Builds the site registry from the configured `[[site]]` entries
    pub fn registry(&self) -> SiteRegistry {
        SiteRegistry::new(self.sites.clone())
    }
}
