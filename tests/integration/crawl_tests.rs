//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small paginated guide and run the
//! full crawl cycle end-to-end.

use guide_scraper::config::{Config, Layout};
use guide_scraper::crawler::{Controller, CrawlControl};
use guide_scraper::images::image_filename;
use guide_scraper::output::{ChannelProgress, ProgressSink, TracingProgress};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `out_dir`
fn create_test_config(start_url: String, out_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawl.start_url = Some(start_url);
    config.http.delay_ms = 0;
    config.http.retry_delay_ms = 1;
    config.http.max_retries = 1;
    config.images.delay_ms = 0;
    config.output.dir = out_dir.path().display().to_string();
    config
}

/// A guide page with a page marker, one paragraph, one image and a next link
fn guide_page(number: u32, title: &str, next_href: Option<&str>) -> String {
    let next = next_href
        .map(|href| format!(r#"<a href="{}">下一页</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><head><title>Wukong Guide - GameSite</title></head><body>
        <div class="header">Site header</div>
        <div class="Mid2L_con">
            <h1>Wukong Guide</h1>
            <p>第{number}页：{title}</p>
            <p>Walkthrough text for page {number}.</p>
            <p><img src="/img/page{number}.png" alt="map {number}"></p>
            <p>责任编辑：someone</p>
        </div>
        <div class="page_css">{next}</div>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_images(server: &MockServer) {
    for n in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/img/page{}.png", n)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![n as u8; 16]))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_three_page_chain_with_cycle() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/1.html", guide_page(1, "序章", Some("2.html")), 1).await;
    mount_page(&mock_server, "/guide/2.html", guide_page(2, "狼斥候", Some("/guide/3.html")), 1).await;
    // The last page links back to the first
    mount_page(&mock_server, "/guide/3.html", guide_page(3, "广智", Some("1.html")), 1).await;
    mount_images(&mock_server).await;

    let out_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);

    let summary = Controller::new(config, Box::new(TracingProgress))
        .unwrap()
        .run()
        .await;

    assert!(summary.success);
    assert!(!summary.cancelled);
    assert_eq!(summary.pages_processed, 3);
    assert_eq!(summary.images_processed, 3);
    assert!(summary.failed_pages.is_empty());
    assert!(summary.failed_images.is_empty());

    let output_path = out_dir.path().join("guide.md");
    assert_eq!(summary.output_path.as_deref(), Some(output_path.as_path()));

    let text = std::fs::read_to_string(&output_path).unwrap();
    assert!(text.starts_with("# Wukong Guide"));
    assert!(text.contains(&format!("*Source: [{0}/guide/1.html]({0}/guide/1.html)*", base_url)));
    assert!(text.contains("  - [第2页：狼斥候](#page-2-狼斥候)"));
    assert!(text.contains("第2页：狼斥候 <a id=\"page-2-狼斥候\"></a>"));
    assert!(text.contains("Walkthrough text for page 3."));
    assert!(!text.contains("责任编辑"));
    assert!(!text.contains("Site header"));

    // Pages appear in chain order
    let first = text.find("page 1.").unwrap();
    let third = text.find("page 3.").unwrap();
    assert!(first < third);

    // Images are referenced locally and exist on disk
    for n in 1..=3 {
        let url = format!("{}/img/page{}.png", base_url, n);
        let file = image_filename(&url);
        assert!(text.contains(&format!("![map {}](images/{})", n, file)));
        assert!(out_dir.path().join("images").join(&file).exists());
    }
}

#[tokio::test]
async fn test_max_pages_limits_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/1.html", guide_page(1, "序章", Some("2.html")), 1).await;
    mount_page(&mock_server, "/guide/2.html", guide_page(2, "狼斥候", Some("3.html")), 1).await;
    mount_page(&mock_server, "/guide/3.html", guide_page(3, "广智", None), 0).await;

    let out_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);
    config.crawl.max_pages = 2;
    config.images.download = false;

    let summary = Controller::new(config, Box::new(TracingProgress))
        .unwrap()
        .run()
        .await;

    assert!(summary.success);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.images_processed, 0);

    let text = std::fs::read_to_string(out_dir.path().join("guide.md")).unwrap();
    // Without downloads images stay remote
    assert!(text.contains(&format!("({}/img/page1.png)", base_url)));
    assert!(!out_dir.path().join("images").exists());
}

#[tokio::test]
async fn test_failed_page_ends_chain_but_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/1.html", guide_page(1, "序章", Some("2.html")), 1).await;
    Mock::given(method("GET"))
        .and(path("/guide/2.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_images(&mock_server).await;

    let out_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);

    let summary = Controller::new(config, Box::new(TracingProgress))
        .unwrap()
        .run()
        .await;

    assert!(summary.success);
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.failed_pages.len(), 1);
    assert_eq!(summary.failed_pages[0].url, format!("{}/guide/2.html", base_url));
    assert!(summary.failed_pages[0].reason.contains("404"));
}

#[tokio::test]
async fn test_empty_page_is_parse_failure_and_chain_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/guide/1.html",
        r#"<html><body><div class="content"></div><a href="2.html">下一页</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/guide/2.html", guide_page(2, "狼斥候", None), 1).await;

    let out_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);
    config.images.download = false;

    let (progress, mut events) = ChannelProgress::new();
    let summary = Controller::new(config, Box::new(progress))
        .unwrap()
        .run()
        .await;

    assert!(summary.success);
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.failed_pages.len(), 1);
    assert_eq!(summary.failed_pages[0].url, format!("{}/guide/1.html", base_url));

    let mut messages = Vec::new();
    while let Ok(event) = events.try_recv() {
        messages.push(event);
    }
    assert_eq!(messages.last().unwrap().percentage, Some(100.0));
    assert!(messages.iter().any(|e| e.message.contains("Could not extract content")));
}

#[tokio::test]
async fn test_stop_on_error_halts_after_parse_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/guide/1.html",
        r#"<html><body><div class="content"></div><a href="2.html">下一页</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/guide/2.html", guide_page(2, "狼斥候", None), 0).await;

    let out_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);
    config.crawl.continue_on_error = false;

    let summary = Controller::new(config, Box::new(TracingProgress))
        .unwrap()
        .run()
        .await;

    assert!(!summary.success);
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(summary.failed_pages.len(), 1);
    assert!(summary.output_path.is_none());
}

/// Cancels the run as soon as the first page starts
struct CancelOnFirstPage {
    control: CrawlControl,
}

impl ProgressSink for CancelOnFirstPage {
    fn report(&self, message: &str, _percentage: Option<f32>) {
        if message.starts_with("Fetching page 1:") {
            self.control.cancel();
        }
    }
}

#[tokio::test]
async fn test_cancel_mid_run_writes_partial_document() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/1.html", guide_page(1, "序章", Some("2.html")), 1).await;
    mount_page(&mock_server, "/guide/2.html", guide_page(2, "狼斥候", None), 0).await;

    let out_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);
    config.images.download = false;

    let control = CrawlControl::new();
    let progress = CancelOnFirstPage {
        control: control.clone(),
    };
    let summary = Controller::new(config, Box::new(progress))
        .unwrap()
        .with_control(control)
        .run()
        .await;

    assert!(summary.cancelled);
    assert!(summary.success);
    assert_eq!(summary.pages_processed, 1);

    let text = std::fs::read_to_string(out_dir.path().join("guide.md")).unwrap();
    assert!(text.contains("Walkthrough text for page 1."));
    assert!(!text.contains("page 2."));
}

#[tokio::test]
async fn test_chapter_layout_groups_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page = |title: &str, next: Option<&str>| {
        let next = next
            .map(|href| format!(r#"<a href="{}">下一页</a>"#, href))
            .unwrap_or_default();
        format!(
            r#"<html><head><title>{title}</title></head><body>
            <div class="Mid2L_con"><h1>{title}</h1><p>Notes for {title}.</p></div>
            <div class="page_css">{next}</div></body></html>"#
        )
    };

    mount_page(&mock_server, "/guide/1.html", page("Chapter One", Some("2.html")), 1).await;
    mount_page(&mock_server, "/guide/2.html", page("Chapter One Section A", Some("3.html")), 1).await;
    mount_page(&mock_server, "/guide/3.html", page("第二章 黄风岭", None), 1).await;

    let out_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/guide/1.html", base_url), &out_dir);
    config.images.download = false;
    config.output.layout = Layout::Chapters;

    let summary = Controller::new(config, Box::new(TracingProgress))
        .unwrap()
        .run()
        .await;

    assert!(summary.success);
    assert_eq!(summary.pages_processed, 3);

    let text = std::fs::read_to_string(out_dir.path().join("guide.md")).unwrap();
    assert!(text.contains("## 1. Chapter One <a id=\"chapter-one\"></a>"));
    assert!(text.contains("### 1.1 Chapter One Section A"));
    assert!(text.contains("## 2. 第二章 黄风岭"));
    assert!(text.contains("    - [1.1 Chapter One Section A](#chapter-one-section-a)"));
}
