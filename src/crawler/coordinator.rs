//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the per-site crawl loop, including:
//! - Loading the visited set from the ledger and seeding the frontier
//! - Fetching pages one at a time and committing their text
//! - Queueing in-domain links breadth-first
//! - Enforcing the iteration and depth bounds

use crate::config::{Config, CrawlerConfig, DepthMode, Site};
use crate::crawler::fetcher::{FetchResult, Fetcher, HttpFetcher};
use crate::crawler::filter::has_excluded_extension;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::parse_html;
use crate::storage::{FileStorage, SiteStorage};
use crate::HarvestError;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Extra time granted on top of the fetcher's own timeout before giving up
const FETCH_GRACE: Duration = Duration::from_secs(5);

/// Bounds and policies for one site crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_iterations: u32,
    pub max_depth: u32,
    pub depth_mode: DepthMode,
    pub fetch_timeout: Duration,
    pub exclude_extensions: Vec<String>,
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            max_depth: config.max_depth,
            depth_mode: config.depth_mode,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            exclude_extensions: config.exclude_extensions.clone(),
        }
    }
}

/// Which bound ended a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationLimit,
    DepthLimit,
}

/// Terminal state of a site crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The frontier ran empty
    Completed,
    /// A bound was reached
    BoundedStop(StopReason),
    /// The cancellation token fired
    Cancelled,
}

/// Crawl lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlPhase {
    Idle,
    Running,
    Done(CrawlStatus),
}

/// Summary of one site crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub site: String,
    pub status: CrawlStatus,
    /// Fetch attempts made
    pub iterations: u32,
    /// Pages committed to the store
    pub pages_saved: u32,
    /// Fetches or commits that failed
    pub failures: u32,
    /// Popped URLs skipped as visited or excluded
    pub skipped: u32,
    /// URLs left in the frontier, in fetch order
    pub frontier: Vec<String>,
    pub elapsed: Duration,
}

/// Ephemeral per-site state, dropped when the crawl ends
struct CrawlState {
    frontier: Frontier,
    visited: HashSet<String>,
    /// Pages successfully processed in this run
    depth: u32,
    iterations: u32,
    pages_saved: u32,
    failures: u32,
    skipped: u32,
}

/// Drives site crawls against a ledger/page store
pub struct Coordinator<S: SiteStorage> {
    settings: CrawlSettings,
    storage: S,
    cancel: CancellationToken,
}

impl<S: SiteStorage> Coordinator<S> {
    pub fn new(settings: CrawlSettings, storage: S) -> Self {
        Self {
            settings,
            storage,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop crawls between iterations
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Crawls one site until the frontier empties, a bound is hit, or the
    /// crawl is cancelled
    ///
    /// The fetcher is consumed and dropped before returning, so its session
    /// never outlives the site crawl. Only a failure to load the ledger is
    /// returned as an error; page-level failures are counted and logged.
    pub async fn crawl_site<F: Fetcher>(
        &mut self,
        site: &Site,
        fetcher: F,
    ) -> Result<CrawlOutcome, HarvestError> {
        let started = Instant::now();
        let mut phase = CrawlPhase::Idle;
        tracing::debug!("Crawl of {} is {:?}", site.name, phase);

        let visited = self.storage.load(&site.name)?;
        tracing::info!(
            "Starting to scrape {} ({} pages already visited)",
            site.domain,
            visited.len()
        );

        let mut state = CrawlState {
            frontier: Frontier::new(),
            visited,
            depth: 0,
            iterations: 0,
            pages_saved: 0,
            failures: 0,
            skipped: 0,
        };
        state.frontier.push(&site.domain, 0, &HashSet::new());
        phase = CrawlPhase::Running;

        while phase == CrawlPhase::Running {
            if self.cancel.is_cancelled() {
                tracing::warn!("Crawl of {} cancelled", site.name);
                phase = CrawlPhase::Done(CrawlStatus::Cancelled);
                break;
            }

            let Some(entry) = state.frontier.pop() else {
                phase = CrawlPhase::Done(CrawlStatus::Completed);
                break;
            };

            if state.visited.contains(&entry.url)
                || has_excluded_extension(&entry.url, &self.settings.exclude_extensions)
            {
                tracing::trace!("Skipping {}", entry.url);
                state.skipped += 1;
                continue;
            }

            state.iterations += 1;
            self.visit(site, &fetcher, &mut state, entry).await;

            if let Some(reason) = self.bound_reached(&state) {
                match reason {
                    StopReason::IterationLimit => tracing::info!(
                        "Reached iteration limit of {} for site {}. Stopping.",
                        self.settings.max_iterations,
                        site.name
                    ),
                    StopReason::DepthLimit => tracing::info!(
                        "Reached maximum depth of {} for site {}. Stopping.",
                        self.settings.max_depth,
                        site.name
                    ),
                }
                phase = CrawlPhase::Done(CrawlStatus::BoundedStop(reason));
            }
        }

        drop(fetcher);

        let status = match phase {
            CrawlPhase::Done(status) => status,
            CrawlPhase::Idle | CrawlPhase::Running => CrawlStatus::Completed,
        };

        tracing::info!(
            "Finished scraping {}: {:?}, {} fetches, {} pages saved, {} failures",
            site.domain,
            status,
            state.iterations,
            state.pages_saved,
            state.failures
        );

        Ok(CrawlOutcome {
            site: site.name.clone(),
            status,
            iterations: state.iterations,
            pages_saved: state.pages_saved,
            failures: state.failures,
            skipped: state.skipped,
            frontier: state.frontier.pending_urls(),
            elapsed: started.elapsed(),
        })
    }

    /// Fetches one URL, commits its text and queues its links
    async fn visit<F: Fetcher>(
        &mut self,
        site: &Site,
        fetcher: &F,
        state: &mut CrawlState,
        entry: FrontierEntry,
    ) {
        tracing::info!("Visiting: {}", entry.url);

        let limit = self.settings.fetch_timeout + FETCH_GRACE;
        let result = match tokio::time::timeout(limit, fetcher.fetch(&entry.url)).await {
            Ok(result) => result,
            Err(_) => FetchResult::NetworkError {
                error: format!("no response within {:?}", limit),
                timed_out: true,
            },
        };

        let (final_url, body) = match result {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            failure => {
                tracing::warn!("Failed to access {}: {}", entry.url, failure);
                state.failures += 1;
                return;
            }
        };

        if !site.contains(&final_url) {
            tracing::warn!(
                "{} redirected outside {} to {}, not storing it",
                entry.url,
                site.domain,
                final_url
            );
            state.failures += 1;
            return;
        }

        let base = match Url::parse(&final_url).or_else(|_| Url::parse(&entry.url)) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot resolve links on {}: {}", entry.url, e);
                state.failures += 1;
                return;
            }
        };
        let parsed = parse_html(&body, &base);
        tracing::debug!(
            "Successfully accessed: {} ({})",
            entry.url,
            parsed.title.as_deref().unwrap_or("untitled")
        );

        match self.storage.exists(&site.name, &entry.url) {
            Ok(true) => {
                tracing::debug!("{} was recorded concurrently, not storing again", entry.url);
                state.visited.insert(entry.url);
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Ledger lookup failed for {}: {}", entry.url, e);
                state.failures += 1;
                return;
            }
        }

        if let Err(e) = self
            .storage
            .commit_page(&site.name, &entry.url, &parsed.text)
        {
            tracing::error!(
                "Failed to store {}; it will be fetched again next run: {}",
                entry.url,
                e
            );
            state.failures += 1;
            return;
        }
        state.visited.insert(entry.url.clone());
        state.pages_saved += 1;

        tracing::debug!("Found {} links on {}", parsed.links.len(), entry.url);
        let level = entry.level + 1;
        for link in &parsed.links {
            if self.should_enqueue(site, link, level) && state.frontier.push(link, level, &state.visited)
            {
                tracing::debug!("Discovered link: {}", link);
            }
        }

        state.depth += 1;
    }

    /// Link admission rules other than frontier/ledger deduplication
    fn should_enqueue(&self, site: &Site, link: &str, level: u32) -> bool {
        if !site.contains(link) {
            return false;
        }

        if has_excluded_extension(link, &self.settings.exclude_extensions) {
            return false;
        }

        match self.settings.depth_mode {
            DepthMode::Levels => level <= self.settings.max_depth,
            DepthMode::Pages => true,
        }
    }

    fn bound_reached(&self, state: &CrawlState) -> Option<StopReason> {
        if state.iterations >= self.settings.max_iterations {
            return Some(StopReason::IterationLimit);
        }

        if self.settings.depth_mode == DepthMode::Pages && state.depth > self.settings.max_depth {
            return Some(StopReason::DepthLimit);
        }

        None
    }
}

/// Runs the crawl stage for every site in the registry
///
/// Sites are crawled one after another, each with a fresh HTTP session. A
/// site whose ledger cannot be loaded is logged and skipped.
///
/// # Example
///
/// ```no_run
/// use scholar_harvest::config::load_config;
/// use scholar_harvest::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let outcomes = run_crawl(&config, CancellationToken::new()).await?;
/// println!("{} sites crawled", outcomes.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    cancel: CancellationToken,
) -> Result<Vec<CrawlOutcome>, HarvestError> {
    let storage = FileStorage::new(&config.output.scrape_dir)?;
    let settings = CrawlSettings::from(&config.crawler);
    let fetch_timeout = settings.fetch_timeout;
    let mut coordinator = Coordinator::new(settings, storage).with_cancellation(cancel.clone());

    let mut outcomes = Vec::new();
    for site in config.registry().iter() {
        if cancel.is_cancelled() {
            tracing::warn!("Cancelled; skipping remaining sites");
            break;
        }

        let fetcher = HttpFetcher::new(&config.user_agent, fetch_timeout, &site.domain)?;
        match coordinator.crawl_site(site, fetcher).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Crawl of {} failed: {}", site.name, e),
        }
    }

    tracing::info!("All sites have been scraped");
    Ok(outcomes)
}
