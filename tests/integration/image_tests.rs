//! Image materialization against a mock image host

use guide_scraper::config::ImageConfig;
use guide_scraper::images::{image_filename, ImageDownloader};
use guide_scraper::ContentItem;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(skip_existing: bool) -> ImageConfig {
    ImageConfig {
        download: true,
        dir: None,
        delay_ms: 0,
        skip_existing,
    }
}

#[tokio::test]
async fn test_download_then_reuse() {
    let mock_server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];

    Mock::given(method("GET"))
        .and(path("/img/boss.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let image_dir = dir.path().join("images");
    let url = format!("{}/img/boss.png", mock_server.uri());

    let mut downloader =
        ImageDownloader::new(reqwest::Client::new(), &image_dir, &create_test_config(true));

    let mut first = vec![ContentItem::image(url.clone(), "boss")];
    let mapping = downloader.download_all(&mut first).await;

    let expected = image_dir.join(image_filename(&url));
    assert_eq!(mapping.get(&url), Some(&expected));
    assert_eq!(std::fs::read(&expected).unwrap(), png);
    assert_eq!(first[0].local_path(), Some(&expected));

    // Same URL again: served from disk, no second request
    let mut second = vec![ContentItem::image(url.clone(), "boss")];
    downloader.download_all(&mut second).await;

    let stats = downloader.stats();
    assert_eq!(stats.attempted, 2);
    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.skipped_existing, 1);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_force_download_ignores_existing_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/map.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/img/map.jpg", mock_server.uri());
    let existing = dir.path().join(image_filename(&url));
    std::fs::write(&existing, b"stale").unwrap();

    let mut downloader =
        ImageDownloader::new(reqwest::Client::new(), dir.path(), &create_test_config(false));
    let mut items = vec![ContentItem::image(url, "map")];
    downloader.download_all(&mut items).await;

    assert_eq!(std::fs::read(&existing).unwrap(), b"fresh");
    assert_eq!(downloader.stats().downloaded, 1);
}

#[tokio::test]
async fn test_http_error_is_item_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/img/gone.png", mock_server.uri());

    let mut downloader =
        ImageDownloader::new(reqwest::Client::new(), dir.path(), &create_test_config(true));
    let mut items = vec![ContentItem::image(url.clone(), "")];
    let mapping = downloader.download_all(&mut items).await;

    assert!(mapping.is_empty());
    assert_eq!(items[0].local_path(), None);
    assert_eq!(downloader.stats().failed, 1);
    assert!(!dir.path().join(image_filename(&url)).exists());
}
