//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for GitHub and drive full crawl
//! runs end-to-end, from the search request to the JSON output file.

use github_search_crawler::config::{CrawlConfig, CrawlerSettings, SearchType, Settings};
use github_search_crawler::crawler::{run_crawl, CrawlSession};
use github_search_crawler::item::{ExtraValue, ResultItem};
use github_search_crawler::CrawlError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates test settings pointing at the mock server
fn create_test_settings(host: &str) -> Settings {
    Settings {
        crawler: CrawlerSettings {
            host: host.to_string(),
            request_timeout: Some(5),
            ..CrawlerSettings::default()
        },
        ..Settings::default()
    }
}

fn create_test_config(keywords: &[&str], search_type: SearchType) -> CrawlConfig {
    CrawlConfig {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        search_type,
        proxies: vec![],
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn repository_search_page(hrefs: &[&str]) -> String {
    let results: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="repo-list-item"><a class="v-align-middle" href="{}">{}</a></li>"#,
                href,
                href.trim_start_matches('/')
            )
        })
        .collect();
    format!(
        r#"<html><body><header><a href="/features">Features</a></header><ul class="repo-list">{}</ul></body></html>"#,
        results
    )
}

fn repository_page(owner: &str, languages: &[(&str, &str)]) -> String {
    let stats: String = languages
        .iter()
        .map(|(language, percent)| {
            format!(
                "<li><a data-ga-click=\"Repository, language stats search click, location:repo overview\">\n<span class=\"lang\">{}</span>\n<span class=\"percent\">{}%</span>\n</a></li>",
                language, percent
            )
        })
        .collect();
    format!(
        r#"<html><body><span class="author"><a rel="author" href="/{owner}">{owner}</a></span><ol class="repository-lang-stats-numbers">{stats}</ol></body></html>"#,
        owner = owner,
        stats = stats
    )
}

fn read_output(path: &Path) -> Vec<ResultItem> {
    let content = std::fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&content).expect("Output is not a JSON item array")
}

fn stats(pairs: &[(&str, &str)]) -> ExtraValue {
    ExtraValue::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[tokio::test]
async fn test_repository_crawl_enriches_every_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "widget gadget"))
        .and(query_param("type", "repositories"))
        .respond_with(html(repository_search_page(&[
            "/alice/widget",
            "/bob/gadget",
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/widget"))
        .respond_with(html(repository_page(
            "alice",
            &[("Go", "80"), ("Python", "20")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bob/gadget"))
        .respond_with(html(repository_page("bob", &[("Rust", "100.0")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());
    let config = create_test_config(&["widget", "gadget"], SearchType::Repositories);

    let count = run_crawl(config, &settings, &output)
        .await
        .expect("Crawl failed");
    assert_eq!(count, 2);

    // Completion order is not deterministic
    let mut items = read_output(&output);
    items.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(items[0].url, format!("{}/alice/widget", mock_server.uri()));
    assert_eq!(
        items[0].extras.get("owner"),
        Some(&ExtraValue::Text("alice".to_string()))
    );
    assert_eq!(
        items[0].extras.get("language_stats"),
        Some(&stats(&[("Go", "80"), ("Python", "20")]))
    );

    assert_eq!(items[1].url, format!("{}/bob/gadget", mock_server.uri()));
    assert_eq!(
        items[1].extras.get("owner"),
        Some(&ExtraValue::Text("bob".to_string()))
    );
    assert_eq!(
        items[1].extras.get("language_stats"),
        Some(&stats(&[("Rust", "100.0")]))
    );
}

#[tokio::test]
async fn test_issue_crawl_keeps_tracked_links_in_page_order() {
    let mock_server = MockServer::start().await;

    let search_page = r#"<html><body>
        <a href="/login">Sign in</a>
        <a href="/o/r/issues/1" data-hydro-click='{"event_type":"search_result.click","payload":{"result_position":1}}'>A</a>
        <a href="/o/r/issues/2" data-hydro-click='{"event_type":"repository.click"}'>B</a>
        <a href="/o/r/issues/3" data-hydro-click='{"event_type":"search_result.click","payload":{"result_position":2}}'>C</a>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "openstack nova"))
        .and(query_param("type", "issues"))
        .respond_with(html(search_page.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());
    let config = create_test_config(&["openstack", "nova"], SearchType::Issues);

    run_crawl(config, &settings, &output)
        .await
        .expect("Crawl failed");

    let items = read_output(&output);
    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/o/r/issues/1", mock_server.uri()),
            format!("{}/o/r/issues/3", mock_server.uri()),
        ]
    );
    assert!(items.iter().all(|i| i.extras.is_empty()));
}

#[tokio::test]
async fn test_wiki_crawl_uses_search_page_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "wikis"))
        .respond_with(html(
            r#"<a href="/o/r/wiki/Home" data-hydro-click='{"event_type":"search_result.click"}'>Home</a>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Wiki results are never followed
    Mock::given(method("GET"))
        .and(path("/o/r/wiki/Home"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());

    let count = run_crawl(
        create_test_config(&["css"], SearchType::Wikis),
        &settings,
        &output,
    )
    .await
    .expect("Crawl failed");

    assert_eq!(count, 1);
    assert_eq!(
        read_output(&output)[0].url,
        format!("{}/o/r/wiki/Home", mock_server.uri())
    );
}

#[tokio::test]
async fn test_bad_search_status_aborts_without_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());

    let result = run_crawl(
        create_test_config(&["css"], SearchType::Issues),
        &settings,
        &output,
    )
    .await;

    match result {
        Err(CrawlError::RequestProcess { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected RequestProcess error, got {:?}", other),
    }
    assert!(!output.exists(), "No output should be written on failure");
}

#[tokio::test]
async fn test_failed_detail_page_aborts_run_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(repository_search_page(&[
            "/alice/widget",
            "/bob/missing",
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/widget"))
        .respond_with(html(repository_page("alice", &[("Go", "100")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bob/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());

    let result = run_crawl(
        create_test_config(&["widget"], SearchType::Repositories),
        &settings,
        &output,
    )
    .await;

    match result {
        Err(CrawlError::RequestProcess { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/bob/missing"));
        }
        other => panic!("Expected RequestProcess error, got {:?}", other),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_owner_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(repository_search_page(&["/alice/widget"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/widget"))
        .respond_with(html("<html><body>Not a repository</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(&mock_server.uri());

    let result = run_crawl(
        create_test_config(&["widget"], SearchType::Repositories),
        &settings,
        &output,
    )
    .await;

    assert!(matches!(result, Err(CrawlError::Extract(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_isolated_item_failures_keep_other_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(repository_search_page(&[
            "/alice/widget",
            "/bob/missing",
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/widget"))
        .respond_with(html(repository_page("alice", &[("Go", "100")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bob/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let mut settings = create_test_settings(&mock_server.uri());
    settings.crawler.isolate_item_failures = true;

    let count = run_crawl(
        create_test_config(&["widget"], SearchType::Repositories),
        &settings,
        &output,
    )
    .await
    .expect("Crawl failed");

    assert_eq!(count, 1);
    let items = read_output(&output);
    assert_eq!(items[0].url, format!("{}/alice/widget", mock_server.uri()));
}

/// Answers a repository page after a fixed delay and records when each request arrived
struct DelayedRepositoryPage {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for DelayedRepositoryPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        html(repository_page("owner", &[("C", "100")])).set_delay(self.delay)
    }
}

/// Most requests that were waiting on a response at the same moment
fn peak_in_flight(arrivals: &[Instant], delay: Duration) -> usize {
    arrivals
        .iter()
        .map(|&at| {
            arrivals
                .iter()
                .filter(|&&other| other <= at && at < other + delay)
                .count()
        })
        .max()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_bounded_fan_out_limits_concurrent_detail_fetches() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    let hrefs: Vec<String> = (0..6).map(|i| format!("/owner/repo{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(repository_search_page(&href_refs)))
        .mount(&mock_server)
        .await;

    for href in &hrefs {
        Mock::given(method("GET"))
            .and(path(href.as_str()))
            .respond_with(DelayedRepositoryPage {
                delay,
                arrivals: Arc::clone(&arrivals),
            })
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let mut settings = create_test_settings(&mock_server.uri());
    settings.crawler.max_concurrent_fetches = Some(2);

    let started = Instant::now();
    let count = run_crawl(
        create_test_config(&["repo"], SearchType::Repositories),
        &settings,
        &output,
    )
    .await
    .expect("Crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(count, 6);
    assert_eq!(read_output(&output).len(), 6);

    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 6);
    let peak = peak_in_flight(&arrivals, delay);
    assert!(peak <= 2, "{} detail fetches were in flight at once", peak);
    // Six fetches two at a time take at least three rounds
    assert!(elapsed >= delay * 3, "Crawl finished in {:?}", elapsed);
}

#[tokio::test]
async fn test_request_timeout_aborts_without_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(String::new()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let mut settings = create_test_settings(&mock_server.uri());
    settings.crawler.request_timeout = Some(1);

    let result = run_crawl(
        create_test_config(&["css"], SearchType::Issues),
        &settings,
        &output,
    )
    .await;

    match result {
        Err(CrawlError::Http { url, source }) => {
            assert!(url.contains("/search?q=css&type=issues"));
            assert!(source.is_timeout(), "Expected a timeout, got {}", source);
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_requests_go_through_configured_proxy() {
    // The host never resolves, so only requests sent through the proxy can succeed
    let host = "http://github.invalid";
    let proxy_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "repositories"))
        .respond_with(html(repository_search_page(&["/alice/widget"])))
        .expect(1)
        .mount(&proxy_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice/widget"))
        .respond_with(html(repository_page("alice", &[("Go", "100")])))
        .expect(1)
        .mount(&proxy_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.json");
    let settings = create_test_settings(host);
    let config = CrawlConfig {
        proxies: vec![proxy_server.uri()],
        ..create_test_config(&["widget"], SearchType::Repositories)
    };

    let count = run_crawl(config, &settings, &output)
        .await
        .expect("Crawl failed");

    assert_eq!(count, 1);
    let items = read_output(&output);
    assert_eq!(items[0].url, format!("{}/alice/widget", host));
    assert_eq!(
        items[0].extras.get("owner"),
        Some(&ExtraValue::Text("alice".to_string()))
    );

    let received = proxy_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received
        .iter()
        .all(|request| request.url.host_str() == Some("github.invalid")));
}

#[tokio::test]
async fn test_session_processes_only_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(
            r#"<a href="/o/r/issues/1" data-hydro-click='{"event_type":"search_result.click"}'>A</a>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let settings = create_test_settings(&mock_server.uri());
    let mut session = CrawlSession::new(
        create_test_config(&["css"], SearchType::Issues),
        settings.crawler,
    )
    .unwrap();

    session.setup().unwrap();
    session.process().await.expect("First process failed");
    assert!(matches!(
        session.process().await,
        Err(CrawlError::AlreadyProcessed)
    ));

    session.close();
    session.close();
    assert_eq!(session.into_items().len(), 1);
}
