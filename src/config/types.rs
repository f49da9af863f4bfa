use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Scholar-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(rename = "site", default)]
    pub sites: Vec<Site>,
}

/// How the traversal engine interprets `max-depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepthMode {
    /// Depth counts pages successfully processed in this run
    #[default]
    Pages,
    /// Depth is the breadth-first level of a page relative to the seed
    Levels,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetch attempts per site and run
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Depth bound, interpreted according to `depth_mode`
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(rename = "depth-mode", default)]
    pub depth_mode: DepthMode,

    /// Per-request timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// File extensions that are never fetched (e.g. ".png")
    #[serde(rename = "exclude-extensions", default = "default_exclude_extensions")]
    pub exclude_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_depth: default_max_depth(),
            depth_mode: DepthMode::default(),
            fetch_timeout_secs: default_fetch_timeout(),
            exclude_extensions: default_exclude_extensions(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ScholarHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output directories for each pipeline stage
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Per-site ledger/page store files
    #[serde(rename = "scrape-dir", default = "default_scrape_dir")]
    pub scrape_dir: PathBuf,

    /// Structured records produced by the extraction stage
    #[serde(rename = "process-dir", default = "default_process_dir")]
    pub process_dir: PathBuf,

    /// Credential documents read by the scoring stage
    #[serde(rename = "credentials-dir", default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,

    /// Eligibility reports
    #[serde(rename = "results-dir", default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            scrape_dir: default_scrape_dir(),
            process_dir: default_process_dir(),
            credentials_dir: default_credentials_dir(),
            results_dir: default_results_dir(),
        }
    }
}

/// Structured extraction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(rename = "timeout-secs", default = "default_extraction_timeout")]
    pub timeout_secs: u64,

    /// Input text is truncated to this many characters
    #[serde(rename = "max-input-chars", default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_extraction_timeout(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// A website to harvest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Site {
    /// Unique, filesystem-safe name used for the site's store file
    pub name: String,

    /// Seed URL; also the prefix every in-domain URL must start with
    pub domain: String,
}

impl Site {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }

    /// Returns true if `url` belongs to this site
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.domain)
    }
}

fn default_max_iterations() -> u32 {
    1000
}

fn default_max_depth() -> u32 {
    50
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_exclude_extensions() -> Vec<String> {
    [".png", ".jpg", ".jpeg", ".mp4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_scrape_dir() -> PathBuf {
    PathBuf::from("scrape-output")
}

fn default_process_dir() -> PathBuf {
    PathBuf::from("process-output")
}

fn default_credentials_dir() -> PathBuf {
    PathBuf::from("credentials")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("eligibility-results")
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_extraction_timeout() -> u64 {
    120
}

fn default_max_input_chars() -> usize {
    100_000
}
