//! Retry accounting of the page fetcher

use guide_scraper::config::HttpConfig;
use guide_scraper::crawler::Fetcher;
use guide_scraper::FetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(max_retries: u32) -> HttpConfig {
    HttpConfig {
        user_agent: "TestScraper/1.0".to_string(),
        delay_ms: 0,
        max_retries,
        retry_delay_ms: 5,
        timeout_secs: 5,
        headers: Default::default(),
    }
}

#[tokio::test]
async fn test_server_error_retried_until_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/guide/1.html"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let result = fetcher
        .fetch(&format!("{}/guide/1.html", mock_server.uri()))
        .await;

    match result {
        Err(FetchError::Transient { reason, .. }) => assert_eq!(reason, "HTTP 503"),
        other => panic!("expected transient failure, got {:?}", other),
    }
    assert_eq!(fetcher.stats().attempts, 4);
    assert_eq!(fetcher.stats().retry_sleeps, 3);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/guide/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let result = fetcher
        .fetch(&format!("{}/guide/missing.html", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Permanent { .. })));
    assert_eq!(fetcher.stats().attempts, 1);
    assert_eq!(fetcher.stats().retry_sleeps, 0);
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let body = fetcher
        .fetch(&format!("{}/flaky.html", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<p>ok</p>");
    assert_eq!(fetcher.stats().attempts, 2);
    assert_eq!(fetcher.stats().retry_sleeps, 1);
}

#[tokio::test]
async fn test_body_decoded_as_utf8_despite_declared_charset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gbk.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=iso-8859-1")
                .set_body_bytes("<p>第1页：序章</p>".as_bytes().to_vec()),
        )
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(0)).unwrap();
    let body = fetcher
        .fetch(&format!("{}/gbk.html", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<p>第1页：序章</p>");
}
