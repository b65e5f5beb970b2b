//! Integration tests for the crawler
//!
//! These tests use wiremock to serve directory listings and file bodies and
//! drive the real HTTP fetcher through full mirror runs.

use cdn_mirror::config::{Config, CrawlerConfig, FetchConfig, RetryConfig};
use cdn_mirror::crawler::{run_mirror, Fetcher, HttpFetcher};
use cdn_mirror::MirrorError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short retry delays
fn create_test_config(max_concurrency: usize) -> Config {
    Config {
        crawler: CrawlerConfig { max_concurrency },
        fetch: FetchConfig {
            listing_timeout_secs: 5,
            download_timeout_secs: 5,
            user_agent: "cdn-mirror-test/1.0".to_string(),
        },
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
        },
    }
}

fn fetcher(config: &Config) -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&config.fetch).expect("Failed to build fetcher"))
}

/// Renders an nginx-style autoindex page
fn autoindex(names: &[&str]) -> String {
    let mut body = String::from("<html><head><title>Index</title></head><body><pre>\n");
    body.push_str("<a href=\"../\">../</a>\n");
    for name in names {
        body.push_str(&format!("<a href=\"{0}\">{0}</a>    01-Jan-2024 00:00    42\n", name));
    }
    body.push_str("</pre></body></html>");
    body
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_of_nested_tree() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/pkg/1.0/", autoindex(&["a.js", "sub/"])).await;
    mount_page(&mock_server, "/pkg/1.0/sub/", autoindex(&["b.css"])).await;
    mount_file(&mock_server, "/pkg/1.0/a.js", "export const a = 1;").await;
    mount_file(&mock_server, "/pkg/1.0/sub/b.css", "body { margin: 0 }").await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(4);
    let base_url = format!("{}/pkg/1.0/", mock_server.uri());

    let report = run_mirror(
        &base_url,
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .expect("Mirror run failed");

    assert_eq!(
        std::fs::read_to_string(dest.path().join("a.js")).unwrap(),
        "export const a = 1;"
    );
    assert_eq!(
        std::fs::read_to_string(dest.path().join("sub/b.css")).unwrap(),
        "body { margin: 0 }"
    );
    assert_eq!(report.visited.len(), 2);
    assert_eq!(report.visited[0].as_str(), base_url);
    assert_eq!(report.visited[1].as_str(), format!("{}sub/", base_url));
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_flaky_file_succeeds_on_third_attempt() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/pkg/", autoindex(&["flaky.js"])).await;

    // First two requests fail, then the body is served
    Mock::given(method("GET"))
        .and(path("/pkg/flaky.js"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_file(&mock_server, "/pkg/flaky.js", "finally").await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(4);

    let report = run_mirror(
        &format!("{}/pkg/", mock_server.uri()),
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.downloaded, 1);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("flaky.js")).unwrap(),
        "finally"
    );

    let requests = mock_server.received_requests().await.unwrap();
    let file_requests = requests
        .iter()
        .filter(|request| request.url.path() == "/pkg/flaky.js")
        .count();
    assert_eq!(file_requests, 3);
}

#[tokio::test]
async fn test_missing_file_is_logged_not_fatal() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/pkg/", autoindex(&["gone.js", "here.js"])).await;
    mount_file(&mock_server, "/pkg/here.js", "here").await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(2);

    let report = run_mirror(
        &format!("{}/pkg/", mock_server.uri()),
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.downloaded, 1);
    assert!(!dest.path().join("gone.js").exists());
    assert!(dest.path().join("here.js").exists());
}

#[tokio::test]
async fn test_second_run_makes_no_file_requests() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/pkg/", autoindex(&["a.js", "b.js"])).await;
    mount_file(&mock_server, "/pkg/a.js", "a").await;
    mount_file(&mock_server, "/pkg/b.js", "b").await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(4);
    let base_url = format!("{}/pkg/", mock_server.uri());

    let first = run_mirror(
        &base_url,
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(first.downloaded, 2);

    mock_server.reset().await;
    mount_page(&mock_server, "/pkg/", autoindex(&["a.js", "b.js"])).await;

    let second = run_mirror(
        &base_url,
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(second.skipped, 2);
    assert_eq!(second.downloaded, 0);
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.url.path() == "/pkg/"));
}

#[tokio::test]
async fn test_unreachable_listing_yields_empty_run() {
    let mock_server = MockServer::start().await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(4);

    let report = run_mirror(
        &format!("{}/nothing-here/", mock_server.uri()),
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.empty_directories, 1);
    assert_eq!(report.downloaded, 0);
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected() {
    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config(4);

    let result = run_mirror(
        "not-a-url",
        dest.path(),
        &config,
        fetcher(&config),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(MirrorError::UrlError(_))));
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&mock_server)
        .await;

    let config = create_test_config(1);
    let fetcher = fetcher(&config);
    let url = url::Url::parse(&format!("{}/teapot", mock_server.uri())).unwrap();

    let result = fetcher.fetch(&url, Duration::from_secs(5)).await;
    assert!(matches!(
        result,
        Err(cdn_mirror::crawler::FetchError::Status { status: 418, .. })
    ));
}
