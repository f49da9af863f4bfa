//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against the file store.

use scholar_harvest::config::{Config, CrawlerConfig, DepthMode, OutputConfig, Site};
use scholar_harvest::crawler::{
    run_crawl, Coordinator, CrawlSettings, CrawlStatus, HttpFetcher, StopReason,
};
use scholar_harvest::storage::{FileStorage, LinkLedger, PageStore};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration with one site rooted at `domain`
fn create_test_config(domain: &str, scrape_dir: &Path, max_iterations: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_iterations,
            max_depth: 50,
            depth_mode: DepthMode::Pages,
            fetch_timeout_secs: 5,
            ..Default::default()
        },
        output: OutputConfig {
            scrape_dir: scrape_dir.to_path_buf(),
            ..Default::default()
        },
        sites: vec![Site::new("testsite", domain)],
        ..Default::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

/// Serves an endless chain: `/` links to `/1`, `/n` links to `/n+1`
struct ChainResponder;

impl Respond for ChainResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let current: u32 = request
            .url
            .path()
            .trim_start_matches('/')
            .parse()
            .unwrap_or(0);
        html(&format!(
            r#"<p>Page {}</p><a href="/{}">next</a>"#,
            current,
            current + 1
        ))
    }
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<h1>Scholarships</h1>
            <a href="/awards">Awards</a>
            <a href="/fees#waiver">Fees</a>
            <a href="{}/elsewhere">External</a>
            <a href="mailto:office@example.edu">Mail</a>"#,
            other_server.uri()
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/awards",
        r#"<p>Global Excellence Award</p><a href="/">Home</a><a href="/fees">Fees</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/fees", "<p>Application fee waived</p>", 1).await;

    Mock::given(method("GET"))
        .respond_with(html("<p>Should never be fetched</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let outcomes = run_crawl(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.pages_saved, 3);
    assert_eq!(outcome.failures, 0);
    assert!(outcome.frontier.is_empty());

    let storage = FileStorage::new(temp_dir.path()).unwrap();
    let pages = storage.load_pages("testsite").unwrap();
    let urls: Vec<&str> = pages.iter().map(|page| page.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            domain.clone(),
            format!("{}awards", domain),
            format!("{}fees", domain),
        ]
    );
    assert!(pages[0].text.contains("Scholarships"));
    assert!(pages[1].text.contains("Global Excellence Award"));
    assert!(temp_dir.path().join("testsite-data.txt").exists());
}

#[tokio::test]
async fn test_second_run_resumes_without_refetching() {
    let mock_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#, 1).await;
    mount_page(&mock_server, "/a", "<p>Leaf</p>", 1).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let first = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(first[0].pages_saved, 2);

    let second = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(second[0].status, CrawlStatus::Completed);
    assert_eq!(second[0].iterations, 0);
    assert_eq!(second[0].pages_saved, 0);

    let mut storage = FileStorage::new(temp_dir.path()).unwrap();
    assert_eq!(storage.load("testsite").unwrap().len(), 2);
    assert_eq!(storage.load_pages("testsite").unwrap().len(), 2);
}

#[tokio::test]
async fn test_excluded_extensions_are_never_requested() {
    let mock_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/poster.png">Poster</a>
           <a href="/clip.MP4?autoplay=1">Clip</a>
           <a href="/guide">Guide</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/guide", "<p>How to apply</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/poster.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clip.MP4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let outcomes = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(outcomes[0].pages_saved, 2);
}

#[tokio::test]
async fn test_infinite_chain_stops_at_iteration_limit() {
    let mock_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(ChainResponder)
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 2);

    let storage = FileStorage::new(temp_dir.path()).unwrap();
    let mut coordinator = Coordinator::new(CrawlSettings::from(&config.crawler), storage);
    let fetcher = HttpFetcher::new(&config.user_agent, Duration::from_secs(5), &domain).unwrap();

    let outcome = coordinator
        .crawl_site(&config.sites[0], fetcher)
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        CrawlStatus::BoundedStop(StopReason::IterationLimit)
    );
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.frontier, vec![format!("{}2", domain)]);
    assert_eq!(coordinator.storage().load_pages("testsite").unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_fetches_are_not_recorded() {
    let mock_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/data.json">Data</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let outcomes = run_crawl(&config, CancellationToken::new()).await.unwrap();
    let outcome = &outcomes[0];
    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.pages_saved, 1);
    assert_eq!(outcome.failures, 2);

    let mut storage = FileStorage::new(temp_dir.path()).unwrap();
    let visited = storage.load("testsite").unwrap();
    assert_eq!(visited.len(), 1);
    assert!(visited.contains(&domain));
}

#[tokio::test]
async fn test_redirect_off_site_is_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", r#"<a href="/go">Go</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/secret", other_server.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html("<p>Off-site text</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let outcomes = run_crawl(&config, CancellationToken::new()).await.unwrap();
    let outcome = &outcomes[0];
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.pages_saved, 1);
    assert_eq!(outcome.failures, 1);

    let mut storage = FileStorage::new(temp_dir.path()).unwrap();
    assert!(!storage.exists("testsite", &format!("{}go", domain)).unwrap());
    let pages = storage.load_pages("testsite").unwrap();
    assert!(pages.iter().all(|page| !page.text.contains("Off-site text")));
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let domain = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(html("<p>Home</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&domain, temp_dir.path(), 100);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcomes = run_crawl(&config, cancel).await.unwrap();
    assert!(outcomes.is_empty());
}
