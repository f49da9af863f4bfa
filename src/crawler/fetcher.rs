//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Classifying responses into success and failure kinds

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: String,
        status_code: u16,
        content_type: String,
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch { content_type: String },

    /// Non-success HTTP status
    HttpError { status_code: u16 },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError { error: String, timed_out: bool },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                final_url,
                status_code,
                ..
            } => write!(f, "HTTP {} from {}", status_code, final_url),
            Self::ContentMismatch { content_type } => {
                write!(f, "expected HTML, got '{}'", content_type)
            }
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError {
                error,
                timed_out: true,
            } => write!(f, "timed out: {}", error),
            Self::NetworkError { error, .. } => write!(f, "network error: {}", error),
        }
    }
}

/// A session able to fetch pages
///
/// One fetcher is owned by one site crawl and dropped when that crawl ends.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Fetcher backed by a `reqwest` connection pool
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Opens a new session with its own connection pool
    ///
    /// Redirects are only followed while they stay under `scope`, the site's
    /// domain prefix. A redirect leaving it is returned as-is and classified
    /// as an HTTP failure.
    pub fn new(
        user_agent: &UserAgentConfig,
        timeout: Duration,
        scope: &str,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout, Some(scope))?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request
/// * `scope` - URL prefix redirects must stay under, if any
///
/// # Example
///
/// ```no_run
/// use scholar_harvest::config::UserAgentConfig;
/// use scholar_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     &UserAgentConfig::default(),
///     Duration::from_secs(30),
///     Some("https://www.daad.de/en/"),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    scope: Option<&str>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(redirect_policy(scope.map(str::to_string)))
        .gzip(true)
        .brotli(true)
        .build()
}

fn redirect_policy(scope: Option<String>) -> Policy {
    let Some(scope) = scope else {
        return Policy::limited(MAX_REDIRECTS);
    };

    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !attempt.url().as_str().starts_with(&scope) {
            tracing::debug!("Not following redirect out of {} to {}", scope, attempt.url());
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML body | Success |
/// | 2xx with other Content-Type | ContentMismatch |
/// | Any other status | HttpError |
/// | Timeout | NetworkError (timed_out) |
/// | Connect / TLS / body error | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            timed_out: false,
        }
    } else if e.is_redirect() {
        FetchResult::NetworkError {
            error: format!("Redirect error: {}", e),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
