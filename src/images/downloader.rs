//! Image materializer: downloads referenced images to a local directory
//!
//! Filenames are derived from a SHA-256 of the image URL, so the same image
//! lands on the same path on every run and `skip_existing` can reuse it.

use crate::config::ImageConfig;
use crate::extract::ContentItem;
use crate::ImageError;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Extension used when the URL path carries none
const DEFAULT_EXTENSION: &str = "jpg";

/// Aggregate counts across every `download_all` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Items handed to the materializer
    pub attempted: u32,

    /// Files fetched over the network
    pub downloaded: u32,

    /// Files already on disk and reused
    pub skipped_existing: u32,

    /// Items that ended without a local copy
    pub failed: u32,
}

impl DownloadStats {
    /// Images that ended up with a local copy
    pub fn succeeded(&self) -> u32 {
        self.downloaded + self.skipped_existing
    }
}

/// Derives the local filename for an image URL
///
/// The stem is the hex SHA-256 of the URL string; the extension comes from
/// the URL path, falling back to `.jpg`.
///
/// # Example
///
/// ```
/// use guide_scraper::images::image_filename;
///
/// let name = image_filename("https://img.example.com/a/boss.png?size=large");
/// assert!(name.ends_with(".png"));
/// assert_eq!(name.len(), 64 + 4);
/// ```
pub fn image_filename(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let stem = hex::encode(hasher.finalize());
    format!("{}.{}", stem, url_extension(url))
}

fn url_extension(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let file = path.rsplit('/').next().unwrap_or_default();
    match file.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Sequential, rate-limited image downloader
///
/// Keeps its own delay clock, independent of the page fetcher. The clock is
/// reset when a download completes, not when it starts.
pub struct ImageDownloader {
    client: Client,
    dir: PathBuf,
    delay: Duration,
    skip_existing: bool,
    last_download_end: Option<Instant>,
    stats: DownloadStats,
}

impl ImageDownloader {
    /// Creates a downloader writing into `dir`
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client, usually shared with the page fetcher
    /// * `dir` - Target directory; created on first download
    /// * `config` - Image settings (delay, skip-existing)
    pub fn new(client: Client, dir: impl Into<PathBuf>, config: &ImageConfig) -> Self {
        Self {
            client,
            dir: dir.into(),
            delay: Duration::from_millis(config.delay_ms),
            skip_existing: config.skip_existing,
            last_download_end: None,
            stats: DownloadStats::default(),
        }
    }

    pub fn stats(&self) -> DownloadStats {
        self.stats
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Downloads every image in `items`, annotating each success in place
    ///
    /// Items that are not images, or images without a URL, are counted as
    /// failures without touching the network. No error escapes this call.
    ///
    /// # Returns
    ///
    /// Mapping from image URL to local path for every image now on disk
    pub async fn download_all<'a, I>(&mut self, items: I) -> HashMap<String, PathBuf>
    where
        I: IntoIterator<Item = &'a mut ContentItem>,
    {
        let mut mapping = HashMap::new();

        for item in items {
            self.stats.attempted += 1;

            let ContentItem::Image {
                url, local_path, ..
            } = item
            else {
                tracing::debug!("Skipping non-image content item");
                self.stats.failed += 1;
                continue;
            };

            match self.download(url).await {
                Ok(path) => {
                    *local_path = Some(path.clone());
                    mapping.insert(url.clone(), path);
                }
                Err(e) => {
                    tracing::warn!("Image download failed: {}", e);
                    self.stats.failed += 1;
                }
            }
        }

        mapping
    }

    /// Downloads one image to its derived path
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Local path of the image (new or reused)
    /// * `Err(ImageError)` - Missing URL, HTTP failure or write failure
    pub async fn download(&mut self, url: &str) -> Result<PathBuf, ImageError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ImageError::MissingUrl);
        }

        let path = self.dir.join(image_filename(url));

        if self.skip_existing && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Image already present: {}", path.display());
            self.stats.skipped_existing += 1;
            return Ok(path);
        }

        self.wait_for_slot().await;
        let result = self.stream_to_file(url, &path).await;
        self.last_download_end = Some(Instant::now());

        match result {
            Ok(()) => {
                tracing::debug!("Downloaded {} -> {}", url, path.display());
                self.stats.downloaded += 1;
                Ok(path)
            }
            Err(e) => {
                // A partial file must not be picked up by skip_existing later
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    async fn wait_for_slot(&self) {
        if let Some(last) = self.last_download_end {
            let remaining = self.delay.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
        }
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<(), ImageError> {
        let http_err = |source: reqwest::Error| ImageError::Http {
            url: url.to_string(),
            source,
        };
        let io_err = |source: std::io::Error| ImageError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let mut file = tokio::fs::File::create(path).await.map_err(io_err)?;

        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;

        Ok(())
    }
}
