//! Scholar-Harvest: a bounded scholarship site harvester
//!
//! This crate crawls a fixed registry of scholarship websites breadth-first,
//! keeps a durable per-site ledger of visited pages so runs can resume,
//! and hands the collected text to external structured-extraction and
//! eligibility-scoring services.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Scholar-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extraction::ExtractionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Scholar-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Site, SiteRegistry};
pub use crawler::{CrawlOutcome, CrawlStatus};
